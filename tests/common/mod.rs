#![allow(dead_code)]

use async_trait::async_trait;
use lawyer_ai_lib::api::{AnalysisResponse, ApiError, ChatReply, ComputeApi, TimelineOutcome};
use lawyer_ai_lib::context::AppContext;
use lawyer_ai_lib::db::Database;
use lawyer_ai_lib::identity::{IdentityProvider, LocalIdentity, Session};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

pub const UID: &str = "user-1";

/// Scripted backend. Every call is counted; `failure` makes every call fail
/// with a 500 carrying that message; `gate` holds responses until released.
#[derive(Default)]
pub struct FakeApi {
    calls: AtomicUsize,
    pub analysis: Mutex<AnalysisResponse>,
    pub chat_reply: Mutex<String>,
    pub timeline: Mutex<Option<TimelineOutcome>>,
    pub failure: Mutex<Option<String>>,
    pub gate: Option<Arc<Notify>>,
    pub questions: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    async fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(ApiError::Api {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ComputeApi for FakeApi {
    async fn analyze(&self, _text: &str) -> Result<AnalysisResponse, ApiError> {
        self.enter().await?;
        Ok(self.analysis.lock().unwrap().clone())
    }

    async fn analyze_with_question(
        &self,
        _text: &str,
        question: &str,
    ) -> Result<AnalysisResponse, ApiError> {
        self.enter().await?;
        self.questions.lock().unwrap().push(question.to_string());
        Ok(AnalysisResponse {
            answer: Some(format!("answer to {}", question)),
            ..Default::default()
        })
    }

    async fn chat(&self, _prompt: &str) -> Result<ChatReply, ApiError> {
        self.enter().await?;
        Ok(ChatReply {
            response: self.chat_reply.lock().unwrap().clone(),
        })
    }

    async fn timeline(&self, _text: &str, _user_id: &str) -> Result<TimelineOutcome, ApiError> {
        self.enter().await?;
        Ok(self
            .timeline
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(TimelineOutcome::Generated {
                events: vec![],
                summary: None,
            }))
    }
}

pub async fn context_with(api: Arc<FakeApi>, store: Arc<Database>) -> AppContext {
    let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentity::signed_in(UID, "token-1"));
    let session = Session::resolve(identity).await;
    AppContext::new(session, api, store)
}

pub async fn signed_out_context(api: Arc<FakeApi>, store: Arc<Database>) -> AppContext {
    let session = Session::resolve(Arc::new(LocalIdentity::unavailable())).await;
    AppContext::new(session, api, store)
}

/// Waits until `pred` holds for the watched state, failing after two seconds.
pub async fn wait_for<S, F>(mut rx: watch::Receiver<S>, pred: F) -> S
where
    S: Clone,
    F: Fn(&S) -> bool,
{
    let waiting = async {
        loop {
            {
                let current = rx.borrow_and_update();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("view dropped");
        }
    };
    tokio::time::timeout(Duration::from_secs(2), waiting)
        .await
        .expect("condition not reached in time")
}
