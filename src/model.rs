use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three question categories of a check-in. Closed set: adding a
/// category must extend every match over this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Fact,
    Feeling,
    Barrier,
}

/// Input widget a question kind maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    FreeText,
    Scale,
    YesNo,
}

impl QuestionKind {
    /// Parses the backend's tag. Unknown tags are a parse error upstream,
    /// never a silent default.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FACT" => Some(QuestionKind::Fact),
            "FEELING" => Some(QuestionKind::Feeling),
            "BARRIER" => Some(QuestionKind::Barrier),
            _ => None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self {
            QuestionKind::Fact => InputMode::FreeText,
            QuestionKind::Feeling => InputMode::Scale,
            QuestionKind::Barrier => InputMode::YesNo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position within the check-in.
    pub order: u32,
    pub kind: QuestionKind,
    pub text: String,
}

/// Current server truth, replaced wholesale on every fetch -- no partial
/// merge. Exactly one deadline is live per variant: the answer deadline on
/// `ActiveQuestion`, the break deadline on `Locked`.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentStatus {
    Idle,
    ActiveQuestion {
        assessment_id: String,
        entry_id: String,
        question: Question,
        expires_at: DateTime<Utc>,
        next_question_order: Option<u32>,
    },
    Locked {
        assessment_id: String,
        unlock_time: DateTime<Utc>,
        next_question_order: Option<u32>,
    },
}

impl AssessmentStatus {
    /// Id of the answerable entry, if one is on screen.
    pub fn entry_id(&self) -> Option<&str> {
        match self {
            AssessmentStatus::ActiveQuestion { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }
}

/// Local draft the user is editing. Cleared whenever the active entry
/// changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerInput {
    pub text: Option<String>,
    pub value: Option<f64>,
}

impl AnswerInput {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty) && self.value.is_none()
    }
}

/// Immutable record of an answer as delivered or queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub question_id: String,
    pub text: Option<String>,
    pub value: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

/// One question of the daily flow as the wizard tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuestion {
    pub id: String,
    pub text: String,
    pub kind: QuestionKind,
    pub answered_at: Option<DateTime<Utc>>,
}

impl DailyQuestion {
    /// Whether this question was already answered within the given calendar
    /// day. An answer from yesterday does not count.
    pub fn answered_on(&self, day: chrono::NaiveDate) -> bool {
        self.answered_at.map_or(false, |at| at.date_naive() == day)
    }
}

/// Short user-facing copy for recoverable failures. None of these block the
/// flow; the next poll or timer cycle is the implicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    StatusUnavailable,
    TriggerFailed,
    SubmitFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::StatusUnavailable => "We couldn't reach the server. Retrying shortly.",
            Notice::TriggerFailed => "Your check-in couldn't be started. Please try again.",
            Notice::SubmitFailed => "Your answer couldn't be sent. Please try again.",
        }
    }
}
