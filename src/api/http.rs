use super::{
    AnalysisResponse, AnalyzeRequest, ApiError, ChatReply, ChatRequest, ComputeApi,
    RawTimelineResponse, TimelineOutcome, TimelineRequest,
};
use crate::config::ClientConfig;
use crate::identity::IdentityProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// reqwest-backed client for the analysis backend.
#[derive(Clone)]
pub struct HttpComputeApi {
    client: Client,
    config: ClientConfig,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpComputeApi {
    pub fn new(config: ClientConfig, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            client: Client::new(),
            config,
            identity,
        }
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        // No token, no request.
        let token = self.identity.id_token().await?;
        let url = self.config.endpoint(route);
        debug!(%url, "POST");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            warn!(%url, status = status.as_u16(), %message, "backend request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Human-readable message for a failed response: the body's `detail` (string,
/// or object carrying `message`), else the status text.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(o)) => o.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .filter(|s| !s.is_empty());

    detail
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[async_trait]
impl ComputeApi for HttpComputeApi {
    async fn analyze(&self, text: &str) -> Result<AnalysisResponse, ApiError> {
        let body = AnalyzeRequest {
            text: text.to_string(),
            question: None,
        };
        self.post("/api/analyze", &body).await
    }

    async fn analyze_with_question(
        &self,
        text: &str,
        question: &str,
    ) -> Result<AnalysisResponse, ApiError> {
        let body = AnalyzeRequest {
            text: text.to_string(),
            question: Some(question.to_string()),
        };
        self.post("/api/analyze", &body).await
    }

    async fn chat(&self, prompt: &str) -> Result<ChatReply, ApiError> {
        let body = ChatRequest {
            prompt: prompt.to_string(),
        };
        self.post("/api/chat", &body).await
    }

    async fn timeline(&self, text: &str, user_id: &str) -> Result<TimelineOutcome, ApiError> {
        let body = TimelineRequest {
            text: text.to_string(),
            user_id: user_id.to_string(),
        };
        let raw: RawTimelineResponse = self.post("/api/timeline", &body).await?;
        Ok(raw.into())
    }
}
