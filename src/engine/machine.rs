use chrono::{DateTime, Utc};

use crate::clock::remaining_secs;
use crate::model::{AnswerInput, AssessmentStatus, Notice, Question};

/// What the modal should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalView {
    /// Nothing on screen: idle, or a break too far out to matter.
    Hidden,
    /// An answerable question with its live countdown.
    Question {
        entry_id: String,
        question: Question,
        remaining_secs: u64,
    },
    /// A short break before the next question.
    Break { remaining_secs: u64 },
}

/// Snapshot published to views after every engine step.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub view: ModalView,
    pub draft: AnswerInput,
    pub notice: Option<Notice>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            view: ModalView::Hidden,
            draft: AnswerInput::default(),
            notice: None,
        }
    }
}

/// Projects server truth plus wall clock into a modal view.
///
/// Lock windows render only while `0 < remaining <= cutoff`: longer breaks
/// are tracked but hidden so they do not interrupt work, and because this
/// projection is recomputed from absolute time every tick, the modal opens by
/// itself the moment the countdown crosses the cutoff -- no poll needed.
pub fn project(status: &AssessmentStatus, now: DateTime<Utc>, cutoff_secs: u64) -> ModalView {
    match status {
        AssessmentStatus::Idle => ModalView::Hidden,
        AssessmentStatus::ActiveQuestion {
            entry_id,
            question,
            expires_at,
            ..
        } => ModalView::Question {
            entry_id: entry_id.clone(),
            question: question.clone(),
            remaining_secs: remaining_secs(*expires_at, now),
        },
        AssessmentStatus::Locked { unlock_time, .. } => {
            let remaining = remaining_secs(*unlock_time, now);
            if remaining > 0 && remaining <= cutoff_secs {
                ModalView::Break {
                    remaining_secs: remaining,
                }
            } else {
                ModalView::Hidden
            }
        }
    }
}
