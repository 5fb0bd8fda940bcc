use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{ActionState, SaveState, ViewCore, SAMPLE_LEGAL_TEXT};
use crate::context::AppContext;
use crate::db::models::{AnalysisDocument, QaPair, ResultBundle};
use crate::db::{DocPath, StoreError, WriteMode};
use crate::doc_processor::{self, LoadError};

pub const LOADED_FROM_DATABASE: &str = "Loaded from database";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTab {
    #[default]
    Summary,
    Clauses,
    Entities,
    Qa,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisState {
    pub text: String,
    pub file_name: String,
    pub results: ResultBundle,
    pub question: String,
    pub active_tab: ResultTab,
    pub analysis: ActionState,
    pub answering: ActionState,
    pub save: SaveState,
    pub updated_at: Option<String>,
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self {
            text: SAMPLE_LEGAL_TEXT.to_string(),
            file_name: String::new(),
            results: ResultBundle::default(),
            question: String::new(),
            active_tab: ResultTab::Summary,
            analysis: ActionState::Idle,
            answering: ActionState::Idle,
            save: SaveState::Saved,
            updated_at: None,
        }
    }
}

impl AnalysisState {
    /// Remote snapshots replace text, results and file name wholesale.
    fn apply_snapshot(&mut self, snapshot: Option<Value>) {
        let Some(value) = snapshot else {
            return;
        };
        match serde_json::from_value::<AnalysisDocument>(value) {
            Ok(doc) => {
                self.text = doc
                    .text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| SAMPLE_LEGAL_TEXT.to_string());
                self.results = doc.results.unwrap_or_default();
                self.file_name = doc
                    .file_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| LOADED_FROM_DATABASE.to_string());
                self.updated_at = doc.updated_at;
            }
            Err(e) => warn!(error = %e, "ignoring malformed analysis snapshot"),
        }
    }
}

/// Document analysis page: summary, clauses, entities and Q&A over one text,
/// persisted at `users/{uid}/documents/latest_analysis`.
pub struct DocumentAnalysisView {
    core: ViewCore<AnalysisState>,
}

impl DocumentAnalysisView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            core: ViewCore::new(ctx, AnalysisState::default()),
        }
    }

    /// Subscribes to the stored analysis. Inert without a user.
    pub async fn mount(&self) -> Result<(), StoreError> {
        let Some(uid) = self.core.ctx.user_id() else {
            return Ok(());
        };
        let path = DocPath::analysis(uid)?;
        let subscription = self.core.ctx.store().subscribe(&path).await?;
        self.core
            .attach(subscription, AnalysisState::apply_snapshot)
            .await;
        Ok(())
    }

    pub async fn unmount(&self) {
        self.core.detach().await;
    }

    pub fn state(&self) -> AnalysisState {
        self.core.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<AnalysisState> {
        self.core.watch()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.core.update(|s| s.text = text);
    }

    pub fn set_question(&self, question: impl Into<String>) {
        let question = question.into();
        self.core.update(|s| s.question = question);
    }

    pub fn select_tab(&self, tab: ResultTab) {
        self.core.update(|s| s.active_tab = tab);
    }

    /// Replaces the text with an uploaded file. No file selected is a no-op.
    pub fn load_file(&self, path: Option<&Path>) -> Result<(), LoadError> {
        let Some(path) = path else {
            return Ok(());
        };
        let loaded = doc_processor::load_document(path)?;
        self.core.update(|s| {
            s.file_name = loaded.file_name;
            s.text = loaded.text;
        });
        Ok(())
    }

    pub fn can_analyze(&self) -> bool {
        let state = self.core.snapshot();
        self.core.is_live()
            && self.core.ctx.user_id().is_some()
            && !state.text.is_empty()
            && !state.analysis.is_loading()
    }

    pub fn can_ask(&self) -> bool {
        let state = self.core.snapshot();
        self.core.is_live()
            && self.core.ctx.user_id().is_some()
            && !state.text.is_empty()
            && !state.question.trim().is_empty()
            && !state.answering.is_loading()
    }

    /// Runs summary, clause and entity extraction. Q&A history is kept; on
    /// failure the previous results stay on screen.
    pub async fn analyze(&self) -> ActionState {
        if !self.can_analyze() {
            return self.core.snapshot().analysis;
        }
        let text = self.core.snapshot().text;
        self.core.update(|s| {
            s.analysis = ActionState::Loading;
            s.active_tab = ResultTab::Summary;
        });

        match self.core.ctx.api().analyze(&text).await {
            Ok(response) => {
                let mut merged = None;
                let applied = self.core.update(|s| {
                    let mut results = ResultBundle {
                        qa: std::mem::take(&mut s.results.qa),
                        ..ResultBundle::default()
                    };
                    response.merge_into(&mut results);
                    s.results = results.clone();
                    s.analysis = ActionState::Success;
                    merged = Some((results, s.file_name.clone()));
                });
                if !applied {
                    return ActionState::Success;
                }
                // The stored text is the text that was analyzed.
                if let Some((results, file_name)) = merged {
                    info!("document analysis complete");
                    self.persist(text, results, file_name).await;
                }
                ActionState::Success
            }
            Err(e) => {
                error!(error = %e, "analysis failed");
                let state = ActionState::Error(e.to_string());
                self.core.update(|s| s.analysis = state.clone());
                state
            }
        }
    }

    /// Asks a question about the current text and appends the answer to the
    /// Q&A history. The question input is cleared only on success.
    pub async fn ask(&self) -> ActionState {
        if !self.can_ask() {
            return self.core.snapshot().answering;
        }
        let AnalysisState { text, question, .. } = self.core.snapshot();
        self.core.update(|s| s.answering = ActionState::Loading);

        match self
            .core
            .ctx
            .api()
            .analyze_with_question(&text, &question)
            .await
        {
            Ok(response) => {
                let pair = QaPair {
                    question,
                    answer: response.answer.unwrap_or_default(),
                };
                let mut merged = None;
                let applied = self.core.update(|s| {
                    s.results.qa.push(pair);
                    s.question.clear();
                    s.answering = ActionState::Success;
                    merged = Some((s.results.clone(), s.file_name.clone()));
                });
                if applied {
                    if let Some((results, file_name)) = merged {
                        self.persist(text, results, file_name).await;
                    }
                }
                ActionState::Success
            }
            Err(e) => {
                error!(error = %e, "question answering failed");
                let state = ActionState::Error(e.to_string());
                self.core.update(|s| s.answering = state.clone());
                state
            }
        }
    }

    async fn persist(&self, text: String, results: ResultBundle, file_name: String) {
        let Some(uid) = self.core.ctx.user_id() else {
            return;
        };
        let document = AnalysisDocument {
            text: Some(text),
            results: Some(results),
            file_name: Some(file_name),
            updated_at: None,
        };
        self.core.update(|s| s.save = SaveState::Saving);
        if let Err(e) = self.write_back(uid, &document).await {
            error!(user_id = uid, error = %e, "saving analysis failed");
        }
        self.core.update(|s| s.save = SaveState::Saved);
    }

    async fn write_back(&self, uid: &str, document: &AnalysisDocument) -> Result<(), StoreError> {
        let path = DocPath::analysis(uid)?;
        let store = self.core.ctx.store();
        store
            .upsert(&path, serde_json::to_value(document)?, WriteMode::Merge)
            .await?;
        // Read our own write back so local state never trails it.
        let latest = store.get(&path).await?;
        self.core.update(|s| s.apply_snapshot(latest));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_fills_defaults() {
        let mut state = AnalysisState {
            text: "local edit".into(),
            file_name: "mine.txt".into(),
            ..Default::default()
        };
        state.apply_snapshot(Some(json!({ "text": "" })));
        assert_eq!(state.text, SAMPLE_LEGAL_TEXT);
        assert_eq!(state.file_name, LOADED_FROM_DATABASE);
        assert_eq!(state.results, ResultBundle::default());
    }

    #[test]
    fn test_absent_document_keeps_local_state() {
        let mut state = AnalysisState {
            text: "local".into(),
            ..Default::default()
        };
        state.apply_snapshot(None);
        assert_eq!(state.text, "local");
    }

    #[test]
    fn test_snapshot_replaces_results() {
        let mut state = AnalysisState::default();
        state.results.summary = "stale".into();
        state.apply_snapshot(Some(json!({
            "text": "remote",
            "results": { "qa": [{ "question": "q", "answer": "a" }] },
            "fileName": "remote.txt"
        })));
        assert_eq!(state.text, "remote");
        assert_eq!(state.results.summary, "");
        assert_eq!(state.results.qa.len(), 1);
        assert_eq!(state.file_name, "remote.txt");
    }
}
