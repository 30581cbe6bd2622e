use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::language::LanguageMode;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the question-answering endpoint.
    pub endpoint: String,
    pub language: LanguageMode,
    /// Tag used when auto mode finds nothing, and for capture in auto mode.
    pub default_language: String,
    /// Delay before opening a search tab after an answer arrives.
    pub navigation_delay_ms: u64,
    /// Also open a web search on the question with every answer.
    pub web_search: bool,
    /// 0 disables the timeout.
    pub answer_timeout_secs: u64,
    /// 0 disables the timeout.
    pub capture_timeout_secs: u64,
    /// Speech-to-text command; prints the transcript on stdout.
    /// `{lang}` is replaced with the capture language tag.
    pub capture_command: Vec<String>,
    /// Text-to-speech command. Placeholders: `{text}`, `{lang}`, `{voice}`,
    /// `{pitch}`, `{rate}`, `{volume}`.
    pub playback_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/ask".into(),
            language: LanguageMode::Auto,
            default_language: "en-US".into(),
            navigation_delay_ms: 500,
            web_search: false,
            answer_timeout_secs: 30,
            capture_timeout_secs: 15,
            capture_command: Vec::new(),
            playback_command: vec![
                "espeak-ng".into(),
                "-v".into(),
                "{voice}".into(),
                "--".into(),
                "{text}".into(),
            ],
        }
    }
}

impl Config {
    /// Directory: ~/.config/voice-ask/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("voice-ask");
        p
    }

    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn answer_timeout(&self) -> Option<Duration> {
        (self.answer_timeout_secs > 0).then(|| Duration::from_secs(self.answer_timeout_secs))
    }

    pub fn capture_timeout(&self) -> Option<Duration> {
        (self.capture_timeout_secs > 0).then(|| Duration::from_secs(self.capture_timeout_secs))
    }
}
