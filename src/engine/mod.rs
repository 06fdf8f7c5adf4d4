pub mod machine;
pub mod poller;
pub mod submitter;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Backend};
use crate::clock::{remaining_secs, Clock};
use crate::config::EngineConfig;
use crate::model::{AnswerInput, AssessmentStatus, Notice};

use self::machine::{project, RenderState};
use self::poller::{PollOutcome, StatusPoller};
use self::submitter::{AnswerSubmitter, SubmitOutcome};

/// A deadline that just ran out, decided against the current status before
/// any side effect runs.
enum Expiry {
    AnswerDeadline(String),
    LockWindow(DateTime<Utc>),
}

/// Commands funneled into the engine loop. `Refresh` is the cross-component
/// signal: any part of the UI holding a sender can force an immediate
/// re-fetch without touching the modal's own polling cadence.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Start or continue a check-in, then re-poll.
    Trigger,
    /// Force an immediate status re-fetch.
    Refresh,
    /// Replace the local draft the user is editing.
    SetDraft(AnswerInput),
    /// Deliver the current draft for the active question.
    Submit,
}

/// Client-resident check-in engine: one cooperative task owning the state
/// machine, the poll cadence, and the per-second countdown. All state lives
/// on this task -- suspension points are network calls and timer ticks, so
/// no locks guard it. At most one deadline is counted down at a time,
/// guaranteed by the [`AssessmentStatus`] sum type.
pub struct CheckinEngine<B, C> {
    backend: Arc<B>,
    clock: C,
    config: EngineConfig,
    poller: StatusPoller<B>,
    submitter: AnswerSubmitter<B>,
    commands: mpsc::Receiver<EngineCommand>,
    render_tx: watch::Sender<RenderState>,
    cancel: CancellationToken,

    status: AssessmentStatus,
    draft: AnswerInput,
    notice: Option<Notice>,
    /// Entry id a forced submission already fired for, so expiry fires at
    /// most once per entry even while the post-submit re-fetch is pending.
    forced_fired_for: Option<String>,
    /// Unlock time whose expiry re-fetch was already issued, once per lock
    /// window.
    lock_refetch_for: Option<DateTime<Utc>>,
}

impl<B: Backend, C: Clock> CheckinEngine<B, C> {
    /// Channels and the cancellation token are caller-owned: the UI keeps
    /// the command sender and the render receiver, and tears the engine down
    /// by cancelling the token.
    pub fn new(
        backend: Arc<B>,
        clock: C,
        config: EngineConfig,
        commands: mpsc::Receiver<EngineCommand>,
        render_tx: watch::Sender<RenderState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            poller: StatusPoller::new(backend.clone()),
            submitter: AnswerSubmitter::new(backend.clone()),
            backend,
            clock,
            config,
            commands,
            render_tx,
            cancel,
            status: AssessmentStatus::Idle,
            draft: AnswerInput::default(),
            notice: None,
            forced_fired_for: None,
            lock_refetch_for: None,
        }
    }

    /// Drives the engine until the cancellation token fires. Teardown drops
    /// the interval timers and any in-flight request future with the loop,
    /// so a late response can never be applied to a torn-down engine.
    pub async fn run(mut self) {
        let mut poll_cadence = interval(self.config.poll_interval());
        poll_cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut second = interval(Duration::from_secs(1));
        second.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            "check-in engine started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("engine cancelled, tearing down");
                    break;
                }
                _ = poll_cadence.tick() => {
                    self.refresh().await;
                }
                _ = second.tick() => {
                    self.on_second().await;
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.handle(command).await,
                        None => break, // all senders gone
                    }
                }
            }
            self.publish();
        }
    }

    async fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Trigger => self.trigger().await,
            EngineCommand::Refresh => self.refresh().await,
            EngineCommand::SetDraft(draft) => self.draft = draft,
            EngineCommand::Submit => self.submit_draft().await,
        }
    }

    async fn trigger(&mut self) {
        match self.backend.trigger_checkin().await {
            // "Already active" is success; either way server truth moved, so
            // re-poll right away instead of waiting out the cadence.
            Ok(()) | Err(ApiError::Conflict) => self.refresh().await,
            Err(error) => {
                warn!(%error, "check-in trigger failed");
                self.notice = Some(Notice::TriggerFailed);
            }
        }
    }

    async fn refresh(&mut self) {
        match self.poller.fetch().await {
            PollOutcome::Replaced(status) => self.apply_status(status),
            // Prior state is preserved; the modal is not cleared.
            PollOutcome::Unavailable(notice) => self.notice = Some(notice),
        }
    }

    /// Replaces server truth wholesale. Responses are applied strictly in
    /// completion order; there is no merging of two in-flight fetches.
    fn apply_status(&mut self, status: AssessmentStatus) {
        if status.entry_id() != self.status.entry_id() {
            // Fresh question (or none): reset the local answer fields.
            self.draft = AnswerInput::default();
            self.forced_fired_for = None;
            self.notice = None;
        }
        if self.notice == Some(Notice::StatusUnavailable) {
            self.notice = None;
        }
        self.status = status;
    }

    /// One-second step: recompute every countdown from its absolute deadline
    /// and act on expiry. Recomputing, instead of decrementing, keeps the
    /// numbers honest after suspension or a burst of delayed ticks.
    async fn on_second(&mut self) {
        let now = self.clock.now();
        let expiry = match &self.status {
            AssessmentStatus::ActiveQuestion {
                entry_id,
                expires_at,
                ..
            } if remaining_secs(*expires_at, now) == 0
                && !self.submitter.is_in_flight()
                && self.forced_fired_for.as_deref() != Some(entry_id.as_str()) =>
            {
                Some(Expiry::AnswerDeadline(entry_id.clone()))
            }
            AssessmentStatus::Locked { unlock_time, .. }
                if remaining_secs(*unlock_time, now) == 0
                    && self.lock_refetch_for != Some(*unlock_time) =>
            {
                Some(Expiry::LockWindow(*unlock_time))
            }
            _ => None,
        };

        match expiry {
            Some(Expiry::AnswerDeadline(entry_id)) => {
                self.forced_fired_for = Some(entry_id.clone());
                let outcome = self
                    .submitter
                    .submit(
                        &entry_id,
                        None,
                        None,
                        true,
                        self.config.question_window_secs as u32,
                    )
                    .await;
                self.finish_submit(outcome).await;
            }
            Some(Expiry::LockWindow(unlock_time)) => {
                // Break over: fetch now instead of waiting out the cadence.
                // Once per window; a failed fetch waits for the next cycle.
                self.lock_refetch_for = Some(unlock_time);
                self.refresh().await;
            }
            None => {}
        }
    }

    async fn submit_draft(&mut self) {
        let (entry_id, expires_at) = match &self.status {
            AssessmentStatus::ActiveQuestion {
                entry_id,
                expires_at,
                ..
            } => (entry_id.clone(), *expires_at),
            _ => return, // nothing answerable on screen
        };
        let window = self.config.question_window_secs;
        let remaining = remaining_secs(expires_at, self.clock.now());
        let time_to_answer = window.saturating_sub(remaining.min(window)) as u32;

        self.notice = None;
        let draft = self.draft.clone();
        let outcome = self
            .submitter
            .submit(&entry_id, draft.text, draft.value, false, time_to_answer)
            .await;
        self.finish_submit(outcome).await;
    }

    /// Every terminal outcome re-fetches status. `Dropped` does nothing: the
    /// outstanding submission owns the flow.
    async fn finish_submit(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Accepted | SubmitOutcome::AlreadyAnswered => self.refresh().await,
            SubmitOutcome::Failed(notice) => {
                self.notice = Some(notice);
                self.refresh().await;
            }
            SubmitOutcome::Dropped => {}
        }
    }

    fn publish(&self) {
        let state = RenderState {
            view: project(
                &self.status,
                self.clock.now(),
                self.config.lock_visibility_cutoff_secs,
            ),
            draft: self.draft.clone(),
            notice: self.notice,
        };
        // Only wake receivers when the rendered state actually changed.
        self.render_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}
