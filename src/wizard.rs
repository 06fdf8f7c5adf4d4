use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{AnswerRequest, ApiError, Backend};
use crate::clock::{remaining_secs, Clock};
use crate::config::EngineConfig;
use crate::model::{AnswerInput, DailyQuestion, StoredAnswer};
use crate::queue::{OfflineQueue, QueueError};

#[derive(Debug, Error)]
pub enum WizardError {
    /// Hard precondition: the daily flow never runs unauthenticated.
    #[error("no authenticated user")]
    NotAuthenticated,
    /// The question list could not be fetched at all.
    #[error("daily questions unavailable: {0}")]
    Unavailable(ApiError),
    /// The offline store rejected a write. Never swallowed: the queue is the
    /// last line of defense against lost answers.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// One sitting of the daily-question flow.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: Uuid,
    pub questions: Vec<DailyQuestion>,
    /// Monotonically non-decreasing within a session; only `reset` or a new
    /// session moves the cursor back.
    pub current_index: usize,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    substantive_answers: usize,
}

/// Completion report for a sitting. `passed` measures substantive
/// (non-empty) answers against the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WizardSummary {
    pub answered: usize,
    pub substantive: usize,
    pub total: usize,
    pub passed: bool,
}

/// Secondary self-contained flow: a fixed ordered question list with a
/// client-local per-question timeout, independent of the server-driven
/// check-in state machine. Submission failures are recovered through the
/// offline queue and never block the user.
pub struct DailyWizard<B, C> {
    backend: Arc<B>,
    clock: C,
    config: EngineConfig,
    queue: OfflineQueue,
    session: Option<WizardSession>,
    draft: AnswerInput,
    /// Client-local deadline for the question on screen. No server deadline
    /// exists in this flow.
    question_deadline: Option<DateTime<Utc>>,
}

impl<B: Backend, C: Clock> DailyWizard<B, C> {
    pub fn new(backend: Arc<B>, clock: C, config: EngineConfig, queue: OfflineQueue) -> Self {
        Self {
            backend,
            clock,
            config,
            queue,
            session: None,
            draft: AnswerInput::default(),
            question_deadline: None,
        }
    }

    /// Starts a fresh session for `user_id`. Fetches the day's questions,
    /// positions the cursor on the first one not yet answered today, or
    /// marks the session complete if none remain.
    pub async fn start_session(&mut self, user_id: Option<&str>) -> Result<(), WizardError> {
        let user_id = user_id.ok_or(WizardError::NotAuthenticated)?;

        let payloads = match self.backend.fetch_daily_questions(user_id).await {
            Ok(payloads) => payloads,
            Err(ApiError::Malformed(error)) => {
                warn!(%error, "daily question list undecodable, starting empty");
                Vec::new()
            }
            Err(error) => return Err(WizardError::Unavailable(error)),
        };

        let mut questions = Vec::new();
        for payload in payloads {
            match payload.normalize() {
                Ok(question) => questions.push(question),
                Err(error) => warn!(%error, "skipping malformed daily question"),
            }
        }

        let now = self.clock.now();
        let today = now.date_naive();
        let first_open = questions.iter().position(|q| !q.answered_on(today));

        self.question_deadline = first_open.map(|_| now + self.timeout());
        self.draft = AnswerInput::default();
        self.session = Some(WizardSession {
            id: Uuid::new_v4(),
            questions,
            current_index: first_open.unwrap_or(0),
            is_completed: first_open.is_none(),
            completed_at: first_open.is_none().then_some(now),
            substantive_answers: 0,
        });
        debug!(open = first_open.is_some(), "daily wizard session started");
        Ok(())
    }

    pub fn session(&self) -> Option<&WizardSession> {
        self.session.as_ref()
    }

    /// The question on screen, if the session is live.
    pub fn current_question(&self) -> Option<&DailyQuestion> {
        let session = self.session.as_ref()?;
        if session.is_completed {
            return None;
        }
        session.questions.get(session.current_index)
    }

    pub fn draft(&self) -> &AnswerInput {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: AnswerInput) {
        self.draft = draft;
    }

    /// Seconds left on the client-local question timer.
    pub fn remaining_secs(&self) -> Option<u64> {
        Some(remaining_secs(self.question_deadline?, self.clock.now()))
    }

    /// Submits `input` for the current question: online first, offline queue
    /// on delivery failure, and local state advances either way -- the flow
    /// never blocks on reachability. Only a queue write failure escapes.
    pub async fn submit_answer(&mut self, input: AnswerInput) -> Result<(), WizardError> {
        let Some(question) = self.current_question().cloned() else {
            return Ok(());
        };
        let now = self.clock.now();
        let window = self.config.wizard_question_timeout_secs;
        let remaining = self
            .question_deadline
            .map_or(0, |deadline| remaining_secs(deadline, now));
        let request = AnswerRequest {
            answer_text: input.text.clone(),
            answer_value: input.value,
            time_to_answer: window.saturating_sub(remaining.min(window)) as u32,
        };

        match self.backend.submit_daily_answer(&question.id, &request).await {
            Ok(()) => debug!(question = %question.id, "daily answer delivered"),
            // Already answered server-side: nothing left to deliver.
            Err(ApiError::Conflict) => {
                debug!(question = %question.id, "daily answer already recorded")
            }
            Err(error) => {
                warn!(question = %question.id, %error, "daily answer failed, queueing offline");
                self.queue.save_answer(StoredAnswer {
                    question_id: question.id.clone(),
                    text: request.answer_text.clone(),
                    value: request.answer_value,
                    submitted_at: now,
                })?;
            }
        }

        if let Some(session) = self.session.as_mut() {
            if let Some(answered) = session.questions.get_mut(session.current_index) {
                answered.answered_at = Some(now); // optimistic
            }
            if !input.is_empty() {
                session.substantive_answers += 1;
            }
        }
        self.next_question();
        Ok(())
    }

    /// Advances the cursor to the next question not yet answered today;
    /// reaching the end completes the session. The index never moves
    /// backwards.
    pub fn next_question(&mut self) {
        let now = self.clock.now();
        let today = now.date_naive();
        let deadline = now + self.timeout();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let next = session
            .questions
            .iter()
            .enumerate()
            .skip(session.current_index + 1)
            .find(|(_, q)| !q.answered_on(today))
            .map(|(index, _)| index);
        match next {
            Some(index) => {
                session.current_index = index;
                self.draft = AnswerInput::default();
                self.question_deadline = Some(deadline);
            }
            None => {
                session.is_completed = true;
                session.completed_at = Some(now);
                self.question_deadline = None;
            }
        }
    }

    /// Client-local timeout step: once the deadline passes, whatever draft
    /// is held -- possibly empty -- goes out and the flow advances.
    pub async fn handle_tick(&mut self) -> Result<(), WizardError> {
        let Some(deadline) = self.question_deadline else {
            return Ok(());
        };
        if remaining_secs(deadline, self.clock.now()) == 0 {
            let draft = std::mem::take(&mut self.draft);
            self.submit_answer(draft).await?;
        }
        Ok(())
    }

    /// Completion report for the current sitting.
    pub fn summary(&self) -> Option<WizardSummary> {
        let session = self.session.as_ref()?;
        let total = session.questions.len();
        let answered = session
            .questions
            .iter()
            .filter(|q| q.answered_at.is_some())
            .count();
        let share = if total == 0 {
            1.0
        } else {
            session.substantive_answers as f64 / total as f64
        };
        Some(WizardSummary {
            answered,
            substantive: session.substantive_answers,
            total,
            passed: share >= self.config.pass_threshold,
        })
    }

    /// Discards the sitting. The next `start_session` begins fresh.
    pub fn reset(&mut self) {
        self.session = None;
        self.draft = AnswerInput::default();
        self.question_deadline = None;
    }

    /// The backing store, exposed as the seam for a future replayer.
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    fn timeout(&self) -> Duration {
        Duration::seconds(self.config.wizard_question_timeout_secs as i64)
    }
}
