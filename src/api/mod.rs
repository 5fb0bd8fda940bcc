pub mod http;

pub use http::HttpComputeApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::models::{Clause, Entity, ResultBundle, TimelineEvent};
use crate::identity::IdentityError;

#[derive(Debug, Serialize, Clone)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct TimelineRequest {
    pub text: String,
    pub user_id: String,
}

/// Partial result bundle as returned by `/api/analyze`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub clauses: Option<Vec<Clause>>,
    #[serde(default)]
    pub entities: Option<Vec<Entity>>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl AnalysisResponse {
    /// Overlays the fields the backend returned; absent fields leave `bundle` untouched.
    pub fn merge_into(self, bundle: &mut ResultBundle) {
        if let Some(summary) = self.summary {
            bundle.summary = summary;
        }
        if let Some(clauses) = self.clauses {
            bundle.clauses = clauses;
        }
        if let Some(entities) = self.entities {
            bundle.entities = entities;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTimelineResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timeline_events: Option<Vec<TimelineEvent>>,
    #[serde(default)]
    pub timeline_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineOutcome {
    Generated {
        events: Vec<TimelineEvent>,
        summary: Option<String>,
    },
    /// The backend answered successfully but reported `{error}`.
    Failed(String),
}

impl From<RawTimelineResponse> for TimelineOutcome {
    fn from(raw: RawTimelineResponse) -> Self {
        match raw.error {
            Some(error) => TimelineOutcome::Failed(error),
            None => TimelineOutcome::Generated {
                events: raw.timeline_events.unwrap_or_default(),
                summary: raw.timeline_summary,
            },
        }
    }
}

/// Backend compute operations. Every call authenticates with the session's
/// bearer token and fails with `NotAuthenticated` before any request is sent
/// when there is none.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResponse, ApiError>;

    async fn analyze_with_question(
        &self,
        text: &str,
        question: &str,
    ) -> Result<AnalysisResponse, ApiError>;

    async fn chat(&self, prompt: &str) -> Result<ChatReply, ApiError>;

    async fn timeline(&self, text: &str, user_id: &str) -> Result<TimelineOutcome, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("User not authenticated.")]
    NotAuthenticated,
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status; `message` is already human-readable.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotSignedIn => ApiError::NotAuthenticated,
            IdentityError::Provider(message) => ApiError::Api {
                status: 401,
                message,
            },
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
