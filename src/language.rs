use serde::{Deserialize, Serialize};

/// How the language tag for capture and playback is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Guess the playback language from the answer text.
    #[default]
    Auto,
    /// Always use this BCP-47 tag, e.g. "de-DE".
    Fixed(String),
}

impl LanguageMode {
    /// Parse a user-entered selector value: "auto" or a language tag.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else if value.eq_ignore_ascii_case("auto") {
            Some(Self::Auto)
        } else {
            Some(Self::Fixed(value.to_string()))
        }
    }

    /// Tag handed to speech capture. Auto mode has nothing to go on before
    /// the user speaks, so it listens in the default language.
    pub fn capture_tag<'a>(&'a self, default: &'a str) -> &'a str {
        match self {
            Self::Auto => default,
            Self::Fixed(tag) => tag,
        }
    }

    /// Tag handed to speech playback for `text`.
    pub fn playback_tag<'a>(&'a self, text: &str, default: &'a str) -> &'a str {
        match self {
            Self::Auto => detect_language(text).unwrap_or(default),
            Self::Fixed(tag) => tag,
        }
    }
}

// Turkish only counts letters that German and French never use, otherwise
// every "ü" or "ç" would be read as Turkish.
const TURKISH: &[char] = &['ğ', 'Ğ', 'ı', 'İ', 'ş', 'Ş'];
const GERMAN: &[char] = &['ä', 'ö', 'ü', 'ß', 'Ä', 'Ö', 'Ü'];
const FRENCH: &[char] = &[
    'é', 'è', 'ê', 'ç', 'à', 'ù', 'â', 'î', 'ô', 'û', 'ë', 'ï', 'œ', 'æ', 'É', 'È', 'Ê', 'Ç',
    'À', 'Ù', 'Â', 'Î', 'Ô', 'Û', 'Ë', 'Ï', 'Œ', 'Æ',
];

/// Best-effort pronunciation hint from diacritics. Sets are checked in a
/// fixed order (Turkish, German, French); the first hit wins.
///
/// This is not language detection: an English sentence quoting "café"
/// comes back as French.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let table: [(&[char], &'static str); 3] =
        [(TURKISH, "tr-TR"), (GERMAN, "de-DE"), (FRENCH, "fr-FR")];
    table
        .iter()
        .find(|(set, _)| text.chars().any(|c| set.contains(&c)))
        .map(|(_, tag)| *tag)
}

/// Primary subtag of a language tag ("de-DE" -> "de"), used to pick a
/// voice in engines that don't take full tags.
pub fn primary_subtag(tag: &str) -> &str {
    tag.split(|c: char| c == '-' || c == '_').next().unwrap_or(tag)
}
