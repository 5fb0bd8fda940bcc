use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, warn};

use super::{ActionState, ViewCore};
use crate::context::AppContext;
use crate::db::models::{ChatMessage, Sender};
use crate::db::{CollectionPath, StoreError, StoredRecord};

pub const GREETING_ID: &str = "initial";
pub const GREETING_TEXT: &str = "Hello! I am a legal assistant AI. I can answer questions based on a vast corpus of legal knowledge. How can I help you today?";

/// Placeholder shown for an empty transcript. Never stored.
pub fn greeting() -> ChatMessage {
    ChatMessage {
        id: GREETING_ID.to_string(),
        text: GREETING_TEXT.to_string(),
        sender: Sender::Bot,
        created_at: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub sending: ActionState,
}

impl ChatState {
    fn apply_snapshot(&mut self, records: Vec<StoredRecord>) {
        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<ChatMessage>(record.body) {
                Ok(mut message) => {
                    message.id = record.id;
                    message.created_at = Some(record.created_at);
                    messages.push(message);
                }
                Err(e) => warn!(id = %record.id, error = %e, "skipping malformed chat message"),
            }
        }
        if messages.is_empty() {
            messages.push(greeting());
        }
        self.messages = messages;
    }
}

/// Legal chatbot page over `users/{uid}/chats/main_chat/messages`.
///
/// Messages are never inserted locally: both sides of the exchange are
/// written to the store and come back through the subscription.
pub struct ChatView {
    core: ViewCore<ChatState>,
}

impl ChatView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            core: ViewCore::new(ctx, ChatState::default()),
        }
    }

    pub async fn mount(&self) -> Result<(), StoreError> {
        let Some(uid) = self.core.ctx.user_id() else {
            return Ok(());
        };
        let path = CollectionPath::chat_messages(uid)?;
        let subscription = self.core.ctx.store().subscribe_collection(&path).await?;
        self.core.attach(subscription, ChatState::apply_snapshot).await;
        Ok(())
    }

    pub async fn unmount(&self) {
        self.core.detach().await;
    }

    pub fn state(&self) -> ChatState {
        self.core.snapshot()
    }

    pub fn watch(&self) -> watch::Receiver<ChatState> {
        self.core.watch()
    }

    pub fn set_input(&self, input: impl Into<String>) {
        let input = input.into();
        self.core.update(|s| s.input = input);
    }

    pub fn can_send(&self) -> bool {
        let state = self.core.snapshot();
        self.core.is_live()
            && self.core.ctx.user_id().is_some()
            && !state.input.trim().is_empty()
            && !state.sending.is_loading()
    }

    /// Stores the user's message, asks the backend and stores the reply. A
    /// failed call is answered with an apology message from the bot.
    pub async fn send(&self) -> ActionState {
        if !self.can_send() {
            return self.core.snapshot().sending;
        }
        let Some(uid) = self.core.ctx.user_id() else {
            return ActionState::Idle;
        };
        let path = match CollectionPath::chat_messages(uid) {
            Ok(path) => path,
            Err(e) => return self.fail(e.to_string()),
        };
        let mut prompt = String::new();
        self.core.update(|s| prompt = std::mem::take(&mut s.input));

        if let Err(e) = self.store_message(&path, Sender::User, &prompt).await {
            return self.fail(e.to_string());
        }

        self.core.update(|s| s.sending = ActionState::Loading);
        let (reply, outcome) = match self.core.ctx.api().chat(&prompt).await {
            Ok(reply) => (reply.response, ActionState::Success),
            Err(e) => {
                error!(user_id = uid, error = %e, "chat request failed");
                (
                    format!("Sorry, I encountered an error: {}", e),
                    ActionState::Error(e.to_string()),
                )
            }
        };
        // Stored even after unmount so the transcript never ends unanswered.
        if let Err(e) = self.store_message(&path, Sender::Bot, &reply).await {
            return self.fail(e.to_string());
        }
        self.core.update(|s| s.sending = outcome.clone());
        outcome
    }

    async fn store_message(
        &self,
        path: &CollectionPath,
        sender: Sender,
        text: &str,
    ) -> Result<String, StoreError> {
        let value = serde_json::to_value(ChatMessage::new(sender, text))?;
        self.core.ctx.store().add(path, value).await
    }

    fn fail(&self, message: String) -> ActionState {
        error!(error = %message, "storing chat message failed");
        let state = ActionState::Error(message);
        self.core.update(|s| s.sending = state.clone());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, at: &str, body: serde_json::Value) -> StoredRecord {
        StoredRecord {
            id: id.into(),
            created_at: at.into(),
            body,
        }
    }

    #[test]
    fn test_empty_transcript_shows_greeting() {
        let mut state = ChatState::default();
        state.apply_snapshot(vec![]);
        assert_eq!(state.messages, vec![greeting()]);
    }

    #[test]
    fn test_snapshot_keeps_store_order() {
        let mut state = ChatState::default();
        state.apply_snapshot(vec![
            record("a", "2024-01-01T00:00:00.000Z", json!({ "text": "hi", "sender": "user" })),
            record("b", "2024-01-01T00:00:01.000Z", json!({ "text": "hello", "sender": "bot" })),
        ]);
        let ids: Vec<_> = state.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.messages[1].sender, Sender::Bot);
    }

    #[test]
    fn test_malformed_records_skipped() {
        let mut state = ChatState::default();
        state.apply_snapshot(vec![record("a", "t", json!({ "sender": "alien" }))]);
        assert_eq!(state.messages, vec![greeting()]);
    }
}
