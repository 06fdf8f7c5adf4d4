use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::{AnswerRequest, ApiError, Backend, DailyQuestionPayload, StatusPayload};
use async_trait::async_trait;

/// REST client for the check-in backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10)) // hard network-level timeout
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    fn check(response: &Response) -> Result<(), ApiError> {
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(ApiError::Conflict),
            status => Err(ApiError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_status(&self) -> Result<StatusPayload, ApiError> {
        let response = self
            .client
            .get(format!("{}/check-in/status", self.base_url))
            .send()
            .await?;
        Self::check(&response)?;
        Ok(response.json().await?)
    }

    async fn trigger_checkin(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/check-in/trigger", self.base_url))
            .send()
            .await?;
        Self::check(&response)
    }

    async fn submit_answer(&self, entry_id: &str, answer: &AnswerRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/check-in/entry/{}/answer", self.base_url, entry_id))
            .json(answer)
            .send()
            .await?;
        Self::check(&response)
    }

    async fn fetch_daily_questions(
        &self,
        user_id: &str,
    ) -> Result<Vec<DailyQuestionPayload>, ApiError> {
        let response = self
            .client
            .get(format!("{}/daily-question/{}", self.base_url, user_id))
            .send()
            .await?;
        Self::check(&response)?;
        Ok(response.json().await?)
    }

    async fn submit_daily_answer(
        &self,
        question_id: &str,
        answer: &AnswerRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!(
                "{}/daily-question/{}/answer",
                self.base_url, question_id
            ))
            .json(answer)
            .send()
            .await?;
        Self::check(&response)
    }
}
