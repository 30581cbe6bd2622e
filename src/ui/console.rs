use std::io::Write;

use super::Presenter;
use crate::app::Command;
use crate::language::LanguageMode;

/// Presenter for a terminal: displays go to stdout, alerts to stderr.
///
/// Loading and stop-button changes are only printed when they flip, so a
/// redundant reset (e.g. a second stop) prints nothing.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    loading: bool,
    stop_enabled: bool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl Presenter for ConsolePresenter {
    fn show_transcript(&mut self, text: &str) {
        self.line(&format!("you: {text}"));
    }

    fn show_response(&mut self, text: &str) {
        if !text.is_empty() {
            self.line(&format!("assistant: {text}"));
        }
    }

    fn set_loading(&mut self, visible: bool) {
        if visible != self.loading {
            self.loading = visible;
            if visible {
                self.line("\u{2026}");
            }
        }
    }

    fn set_stop_enabled(&mut self, enabled: bool) {
        if enabled != self.stop_enabled {
            self.stop_enabled = enabled;
            if enabled {
                self.line("(type /stop to cancel)");
            }
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("!! {message}");
    }
}

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Help,
    Unknown(String),
    Empty,
}

pub const HELP: &str = "\
Type a question and press Enter to ask it.
  /listen        ask by voice
  /stop          cancel listening, the request or the speech
  /lang <tag>    speak in a fixed language (e.g. de-DE), or /lang auto
  /quit          exit";

/// Parse a console line. Anything not starting with `/` is a question.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Command(Command::Submit(line.to_string()));
    };
    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name {
        "listen" | "start" => Input::Command(Command::Start),
        "stop" => Input::Command(Command::Stop),
        "quit" | "exit" => Input::Command(Command::Shutdown),
        "help" => Input::Help,
        "lang" => match LanguageMode::parse(arg) {
            Some(mode) => Input::Command(Command::SetLanguage(mode)),
            None => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}
