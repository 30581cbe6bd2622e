use thiserror::Error;

/// Failures reported by a speech capture service.
///
/// Codes mirror the ones speech recognition engines commonly emit, so the
/// user-facing notification reads the same whichever engine is behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no-speech")]
    NoSpeech,
    #[error("aborted")]
    Aborted,
    #[error("audio-capture")]
    AudioCapture(String),
    #[error("network")]
    Network(String),
    #[error("not-allowed")]
    NotAllowed,
    #[error("service-not-allowed")]
    ServiceNotAllowed(String),
}

impl CaptureError {
    /// Extra detail for the log, if the error carries any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::AudioCapture(d) | Self::Network(d) | Self::ServiceNotAllowed(d) => Some(d),
            _ => None,
        }
    }
}

/// Failures of a call to the answer service.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The request was cancelled through its cancellation token.
    #[error("request cancelled")]
    Cancelled,
    #[error("request timed out after {0}s")]
    TimedOut(u64),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AnswerError {
    /// True when the failure came from our own cancellation rather than
    /// from the network or the backend.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures of a speech playback service.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
