use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{ActionState, SaveState, ViewCore, SAMPLE_LEGAL_TEXT};
use crate::api::TimelineOutcome;
use crate::context::AppContext;
use crate::db::models::{TimelineDocument, TimelineEvent};
use crate::db::{DocPath, StoreError, WriteMode};

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to generate a timeline.";
pub const NO_SUMMARY: &str = "No summary generated.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineState {
    pub text: String,
    pub events: Vec<TimelineEvent>,
    pub summary: String,
    pub generating: ActionState,
    pub save: SaveState,
    pub error: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            text: SAMPLE_LEGAL_TEXT.to_string(),
            events: Vec::new(),
            summary: String::new(),
            generating: ActionState::Idle,
            save: SaveState::Saved,
            error: None,
            updated_at: None,
        }
    }
}

impl TimelineState {
    fn apply_snapshot(&mut self, snapshot: Option<Value>) {
        let Some(value) = snapshot else {
            return;
        };
        match serde_json::from_value::<TimelineDocument>(value) {
            Ok(doc) => {
                self.text = doc
                    .text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| SAMPLE_LEGAL_TEXT.to_string());
                self.events = doc.timeline_events.unwrap_or_default();
                self.summary = doc.timeline_summary.unwrap_or_default();
                self.updated_at = doc.updated_at;
            }
            Err(e) => warn!(error = %e, "ignoring malformed timeline snapshot"),
        }
    }
}

/// Timeline page, persisted at `users/{uid}/timelines/latest_timeline`.
pub struct TimelineView {
    core: ViewCore<TimelineState>,
}

impl TimelineView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            core: ViewCore::new(ctx, TimelineState::default()),
        }
    }

    pub async fn mount(&self) -> Result<(), StoreError> {
        let Some(uid) = self.core.ctx.user_id() else {
            return Ok(());
        };
        let path = DocPath::timeline(uid)?;
        let subscription = self.core.ctx.store().subscribe(&path).await?;
        self.core
            .attach(subscription, TimelineState::apply_snapshot)
            .await;
        Ok(())
    }

    pub async fn unmount(&self) {
        self.core.detach().await;
    }

    pub fn state(&self) -> TimelineState {
        self.core.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<TimelineState> {
        self.core.watch()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.core.update(|s| s.text = text);
    }

    pub fn can_generate(&self) -> bool {
        let state = self.core.snapshot();
        self.core.is_live()
            && self.core.ctx.user_id().is_some()
            && !state.text.trim().is_empty()
            && !state.generating.is_loading()
    }

    /// Extracts events and a summary from the text. Previous events and
    /// summary are cleared before the request goes out and stay cleared on
    /// failure.
    pub async fn generate(&self) -> ActionState {
        let state = self.core.snapshot();
        if !self.core.is_live() || state.generating.is_loading() {
            return state.generating;
        }
        let uid = match self.core.ctx.user_id() {
            Some(uid) if !state.text.trim().is_empty() => uid,
            _ => {
                self.core
                    .update(|s| s.error = Some(EMPTY_TEXT_MESSAGE.to_string()));
                return state.generating;
            }
        };
        let text = state.text;

        self.core.update(|s| {
            s.generating = ActionState::Loading;
            s.error = None;
            s.events.clear();
            s.summary.clear();
        });

        match self.core.ctx.api().timeline(&text, uid).await {
            Ok(TimelineOutcome::Generated { events, summary }) => {
                let summary = summary
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| NO_SUMMARY.to_string());
                let applied = self.core.update(|s| {
                    s.events = events.clone();
                    s.summary = summary.clone();
                    s.generating = ActionState::Success;
                });
                if applied {
                    info!(user_id = uid, events = events.len(), "timeline generated");
                    self.persist(uid, text, events, summary).await;
                }
                ActionState::Success
            }
            Ok(TimelineOutcome::Failed(message)) => {
                warn!(user_id = uid, %message, "backend could not build timeline");
                self.fail(message)
            }
            Err(e) => {
                error!(user_id = uid, error = %e, "timeline request failed");
                self.fail(format!(
                    "Failed to generate timeline: {}. Please check your network connection or server status.",
                    e
                ))
            }
        }
    }

    fn fail(&self, message: String) -> ActionState {
        let state = ActionState::Error(message.clone());
        self.core.update(|s| {
            s.error = Some(message);
            s.events.clear();
            s.summary.clear();
            s.generating = state.clone();
        });
        state
    }

    async fn persist(&self, uid: &str, text: String, events: Vec<TimelineEvent>, summary: String) {
        let document = TimelineDocument {
            text: Some(text),
            timeline_events: Some(events),
            timeline_summary: Some(summary),
            updated_at: None,
        };
        self.core.update(|s| s.save = SaveState::Saving);
        match self.write_back(uid, &document).await {
            Ok(()) => info!(user_id = uid, "timeline saved"),
            Err(e) => error!(user_id = uid, error = %e, "saving timeline failed"),
        }
        self.core.update(|s| s.save = SaveState::Saved);
    }

    async fn write_back(&self, uid: &str, document: &TimelineDocument) -> Result<(), StoreError> {
        let path = DocPath::timeline(uid)?;
        let store = self.core.ctx.store();
        store
            .upsert(&path, serde_json::to_value(document)?, WriteMode::Replace)
            .await?;
        let latest = store.get(&path).await?;
        self.core.update(|s| s.apply_snapshot(latest));
        Ok(())
    }
}
