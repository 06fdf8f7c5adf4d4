use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AssessmentStatus, DailyQuestion, Question, QuestionKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown state tag `{0}`")]
    UnknownState(String),
    #[error("`{field}` missing for `{context}`")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },
    #[error("unknown question type `{0}`")]
    UnknownKind(String),
}

/// Status envelope exactly as the backend sends it: every field optional, so
/// a half-filled payload still deserializes instead of failing mid-render.
/// Strictness lives in [`StatusPayload::normalize`], the one place wire shape
/// becomes domain truth.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusPayload {
    pub state: Option<String>,
    pub assessment_id: Option<String>,
    pub entry_id: Option<String>,
    pub question: Option<QuestionPayload>,
    pub unlock_time: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub next_question_order: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionPayload {
    pub order: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
}

impl StatusPayload {
    /// Boundary parser: wire shape to domain sum type. Every invariant the
    /// engine relies on -- question present iff active, unlock time present
    /// iff locked -- is checked here and nowhere else.
    pub fn normalize(self) -> Result<AssessmentStatus, ParseError> {
        match self.state.as_deref() {
            None | Some("IDLE") => Ok(AssessmentStatus::Idle),
            Some("ACTIVE_QUESTION") => {
                let question = self
                    .question
                    .ok_or(ParseError::MissingField {
                        field: "question",
                        context: "ACTIVE_QUESTION",
                    })?
                    .normalize()?;
                Ok(AssessmentStatus::ActiveQuestion {
                    assessment_id: self.assessment_id.unwrap_or_default(),
                    entry_id: self.entry_id.ok_or(ParseError::MissingField {
                        field: "entryId",
                        context: "ACTIVE_QUESTION",
                    })?,
                    question,
                    expires_at: self.expires_at.ok_or(ParseError::MissingField {
                        field: "expiresAt",
                        context: "ACTIVE_QUESTION",
                    })?,
                    next_question_order: self.next_question_order,
                })
            }
            Some("LOCKED") => Ok(AssessmentStatus::Locked {
                assessment_id: self.assessment_id.unwrap_or_default(),
                unlock_time: self.unlock_time.ok_or(ParseError::MissingField {
                    field: "unlockTime",
                    context: "LOCKED",
                })?,
                next_question_order: self.next_question_order,
            }),
            Some(other) => Err(ParseError::UnknownState(other.to_string())),
        }
    }
}

impl QuestionPayload {
    pub fn normalize(self) -> Result<Question, ParseError> {
        let tag = self.kind.ok_or(ParseError::MissingField {
            field: "type",
            context: "question",
        })?;
        let kind =
            QuestionKind::from_tag(&tag).ok_or_else(|| ParseError::UnknownKind(tag.clone()))?;
        Ok(Question {
            order: self.order.unwrap_or(1),
            kind,
            text: self.text.unwrap_or_default(),
        })
    }
}

/// One daily question as listed by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyQuestionPayload {
    pub id: Option<String>,
    pub question: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl DailyQuestionPayload {
    pub fn normalize(self) -> Result<DailyQuestion, ParseError> {
        let id = self.id.ok_or(ParseError::MissingField {
            field: "id",
            context: "dailyQuestion",
        })?;
        let tag = self.kind.ok_or(ParseError::MissingField {
            field: "type",
            context: "dailyQuestion",
        })?;
        let kind =
            QuestionKind::from_tag(&tag).ok_or_else(|| ParseError::UnknownKind(tag.clone()))?;
        Ok(DailyQuestion {
            id,
            text: self.question.unwrap_or_default(),
            kind,
            answered_at: self.answered_at,
        })
    }
}

/// Body of both answer endpoints, serialized camelCase as the backend
/// consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub answer_text: Option<String>,
    pub answer_value: Option<f64>,
    pub time_to_answer: u32,
}
