use std::sync::Arc;

use tracing::warn;

use crate::api::{ApiError, Backend};
use crate::model::{AssessmentStatus, Notice};

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Fresh server truth; replaces the previous status wholesale.
    Replaced(AssessmentStatus),
    /// Transport failure: prior rendered state is preserved, a notice is
    /// surfaced, and the next cycle retries.
    Unavailable(Notice),
}

pub struct StatusPoller<B> {
    backend: Arc<B>,
}

impl<B: Backend> StatusPoller<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// The single fetch entry point. The background cadence, manual
    /// triggers, and countdown expiry all funnel through here, so the engine
    /// always renders from the latest completed fetch.
    pub async fn fetch(&self) -> PollOutcome {
        match self.backend.fetch_status().await {
            Ok(payload) => match payload.normalize() {
                Ok(status) => PollOutcome::Replaced(status),
                Err(error) => {
                    // Malformed payload: substitute the empty structure
                    // instead of poisoning the render.
                    warn!(%error, "status payload failed to normalize");
                    PollOutcome::Replaced(AssessmentStatus::Idle)
                }
            },
            Err(ApiError::Malformed(error)) => {
                warn!(%error, "status response undecodable");
                PollOutcome::Replaced(AssessmentStatus::Idle)
            }
            Err(error) => {
                warn!(%error, "status fetch failed");
                PollOutcome::Unavailable(Notice::StatusUnavailable)
            }
        }
    }
}
