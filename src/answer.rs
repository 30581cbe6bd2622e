use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnswerError;

/// Request body for the `/ask` endpoint.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Raw `/ask` response body. Success and failure share one shape and are
/// told apart by whether `response` is present.
#[derive(Debug, Default, Deserialize)]
struct AskResponse {
    response: Option<String>,
    open_images: Option<bool>,
    query: Option<String>,
    error: Option<String>,
}

/// Decoded outcome of a question that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Reply {
        text: String,
        /// Backend asks for an image search to be opened.
        open_images: bool,
        /// Search term for that image search.
        query: Option<String>,
    },
    /// The backend answered, but with an `error` message instead.
    ServiceError(String),
}

impl Answer {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply {
            text: text.into(),
            open_images: false,
            query: None,
        }
    }

    /// Decode a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, AnswerError> {
        let raw: AskResponse = serde_json::from_slice(body)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: AskResponse) -> Self {
        match raw.response {
            Some(text) if !text.is_empty() => Self::Reply {
                text,
                open_images: raw.open_images.unwrap_or(false),
                query: raw.query.filter(|q| !q.trim().is_empty()),
            },
            _ => Self::ServiceError(raw.error.unwrap_or_else(|| "no response".into())),
        }
    }
}

/// The question-answering backend.
///
/// Implementations don't need to watch for cancellation themselves: the
/// coordinator races every call against its cancellation token and drops
/// the future when the session is stopped.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Answer, AnswerError>;
}

/// Answer service backed by an HTTP endpoint.
pub struct HttpAnswerService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnswerService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, question: &str) -> Result<Answer, AnswerError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest { question })
            .send()
            .await?;

        // The backend reports its own failures as a JSON body with a 5xx
        // status, so the body decides, not the status code.
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            log::warn!("Answer service returned {status}");
        }
        Answer::from_json(&body)
    }
}
