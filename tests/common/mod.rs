#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use pulsecheck::api::types::QuestionPayload;
use pulsecheck::api::{AnswerRequest, ApiError, Backend, DailyQuestionPayload, StatusPayload};

/// Two-phase gate so a test can hold a submission open: the mock releases a
/// permit on entry and then waits for one before answering.
pub struct Gate {
    pub entered: Semaphore,
    pub release: Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        })
    }
}

/// Scripted backend standing in for the REST API. Responses are popped per
/// call; an empty script answers with the benign default.
#[derive(Default)]
pub struct MockBackend {
    status_responses: Mutex<VecDeque<Result<StatusPayload, ApiError>>>,
    status_calls: AtomicUsize,
    trigger_responses: Mutex<VecDeque<Result<(), ApiError>>>,
    submit_responses: Mutex<VecDeque<Result<(), ApiError>>>,
    submit_calls: AtomicUsize,
    submissions: Mutex<Vec<(String, AnswerRequest)>>,
    daily_list_responses: Mutex<VecDeque<Result<Vec<DailyQuestionPayload>, ApiError>>>,
    daily_responses: Mutex<VecDeque<Result<(), ApiError>>>,
    daily_submissions: Mutex<Vec<(String, AnswerRequest)>>,
    submit_gate: Mutex<Option<Arc<Gate>>>,
}

impl MockBackend {
    pub fn push_status(&self, response: Result<StatusPayload, ApiError>) {
        self.status_responses.lock().unwrap().push_back(response);
    }

    pub fn push_trigger(&self, response: Result<(), ApiError>) {
        self.trigger_responses.lock().unwrap().push_back(response);
    }

    pub fn push_submit(&self, response: Result<(), ApiError>) {
        self.submit_responses.lock().unwrap().push_back(response);
    }

    pub fn push_daily_list(&self, response: Result<Vec<DailyQuestionPayload>, ApiError>) {
        self.daily_list_responses.lock().unwrap().push_back(response);
    }

    pub fn push_daily(&self, response: Result<(), ApiError>) {
        self.daily_responses.lock().unwrap().push_back(response);
    }

    pub fn set_submit_gate(&self, gate: Arc<Gate>) {
        *self.submit_gate.lock().unwrap() = Some(gate);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(String, AnswerRequest)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn daily_submissions(&self) -> Vec<(String, AnswerRequest)> {
        self.daily_submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(StatusPayload::default()))
    }

    async fn trigger_checkin(&self) -> Result<(), ApiError> {
        self.trigger_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn submit_answer(&self, entry_id: &str, answer: &AnswerRequest) -> Result<(), ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submissions
            .lock()
            .unwrap()
            .push((entry_id.to_string(), answer.clone()));
        let gate = self.submit_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.add_permits(1);
            gate.release.acquire().await.expect("gate closed").forget();
        }
        self.submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn fetch_daily_questions(
        &self,
        _user_id: &str,
    ) -> Result<Vec<DailyQuestionPayload>, ApiError> {
        self.daily_list_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_daily_answer(
        &self,
        question_id: &str,
        answer: &AnswerRequest,
    ) -> Result<(), ApiError> {
        self.daily_submissions
            .lock()
            .unwrap()
            .push((question_id.to_string(), answer.clone()));
        self.daily_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

pub fn idle_payload() -> StatusPayload {
    StatusPayload {
        state: Some("IDLE".to_string()),
        ..StatusPayload::default()
    }
}

pub fn active_payload(entry_id: &str, expires_at: DateTime<Utc>) -> StatusPayload {
    StatusPayload {
        state: Some("ACTIVE_QUESTION".to_string()),
        assessment_id: Some("a-1".to_string()),
        entry_id: Some(entry_id.to_string()),
        question: Some(QuestionPayload {
            order: Some(1),
            kind: Some("FEELING".to_string()),
            text: Some("How focused do you feel right now?".to_string()),
        }),
        expires_at: Some(expires_at),
        unlock_time: None,
        next_question_order: Some(2),
    }
}

pub fn locked_payload(unlock_time: DateTime<Utc>) -> StatusPayload {
    StatusPayload {
        state: Some("LOCKED".to_string()),
        assessment_id: Some("a-1".to_string()),
        unlock_time: Some(unlock_time),
        next_question_order: Some(2),
        ..StatusPayload::default()
    }
}

pub fn daily_payload(
    id: &str,
    kind: &str,
    answered_at: Option<DateTime<Utc>>,
) -> DailyQuestionPayload {
    DailyQuestionPayload {
        id: Some(id.to_string()),
        question: Some(format!("Daily question {id}")),
        kind: Some(kind.to_string()),
        answered_at,
    }
}

/// Lets the engine task drain everything that is currently runnable without
/// letting paused time auto-advance.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
