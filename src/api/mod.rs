pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{AnswerRequest, DailyQuestionPayload, ParseError, StatusPayload};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never reached the backend: DNS, refused connection,
    /// timeout. The only class eligible for the offline queue.
    #[error("transport failure: {0}")]
    Transport(String),
    /// HTTP 400: already answered / already active. Success-equivalent for
    /// every caller.
    #[error("conflict: resource already in target state")]
    Conflict,
    /// Any other non-success status.
    #[error("server returned status {0}")]
    Status(u16),
    /// The body did not decode into the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Malformed(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Backend seam. The engine and the wizard only speak through this trait, so
/// tests substitute a scripted backend instead of a live server.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError>;

    /// Creates or continues a check-in. A `Conflict` means one is already
    /// active; callers treat that as success and re-poll.
    async fn trigger_checkin(&self) -> Result<(), ApiError>;

    async fn submit_answer(&self, entry_id: &str, answer: &AnswerRequest) -> Result<(), ApiError>;

    async fn fetch_daily_questions(
        &self,
        user_id: &str,
    ) -> Result<Vec<DailyQuestionPayload>, ApiError>;

    async fn submit_daily_answer(
        &self,
        question_id: &str,
        answer: &AnswerRequest,
    ) -> Result<(), ApiError>;
}
