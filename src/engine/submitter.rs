use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{AnswerRequest, ApiError, Backend};
use crate::model::Notice;

/// Answer text sent when the deadline fires with nothing entered. The flow
/// must always advance; the server records the sentinel as "not answered".
pub const FORCED_ANSWER_TEXT: &str = "__unanswered__";

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server accepted the answer.
    Accepted,
    /// Server already had an answer for this entry. Success-equivalent.
    AlreadyAnswered,
    /// Another submission was in flight; this call was dropped, not queued.
    Dropped,
    /// Retryable failure. The guard has been released.
    Failed(Notice),
}

impl SubmitOutcome {
    /// Terminal outcomes require a status re-fetch by the caller.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmitOutcome::Dropped)
    }
}

/// Releases the single-flight guard on every exit path, including panics and
/// early returns.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Single-flight guard over answer delivery: at most one submission is in
/// progress at any time. The flag is taken before the network call and a
/// concurrent caller gets [`SubmitOutcome::Dropped`] back -- never queued,
/// never retried on its behalf.
pub struct AnswerSubmitter<B> {
    backend: Arc<B>,
    in_flight: Arc<AtomicBool>,
}

impl<B> Clone for AnswerSubmitter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<B: Backend> AnswerSubmitter<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Delivers one answer. `forced` replaces the payload with the sentinel.
    pub async fn submit(
        &self,
        entry_id: &str,
        answer_text: Option<String>,
        answer_value: Option<f64>,
        forced: bool,
        time_to_answer: u32,
    ) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(entry_id, "submission already in flight, dropping");
            return SubmitOutcome::Dropped;
        }
        let _guard = FlightGuard(self.in_flight.clone());

        let request = AnswerRequest {
            answer_text: if forced {
                Some(FORCED_ANSWER_TEXT.to_string())
            } else {
                answer_text
            },
            answer_value: if forced { None } else { answer_value },
            time_to_answer,
        };

        match self.backend.submit_answer(entry_id, &request).await {
            Ok(()) => SubmitOutcome::Accepted,
            Err(ApiError::Conflict) => {
                debug!(entry_id, "entry already answered, treating as success");
                SubmitOutcome::AlreadyAnswered
            }
            Err(error) => {
                warn!(entry_id, %error, "answer submission failed");
                SubmitOutcome::Failed(Notice::SubmitFailed)
            }
        }
    }
}
