use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tokio::sync::watch;

use super::StoreError;

/// Path of a single document, e.g. `users/{uid}/documents/latest_analysis`.
/// Always an even number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

/// Path of an ordered record collection, e.g. `users/{uid}/chats/main_chat/messages`.
/// Always an odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

fn join_segments(segments: &[&str]) -> Result<String, StoreError> {
    if segments.is_empty() {
        return Err(StoreError::InvalidPath(String::new()));
    }
    for segment in segments {
        if segment.is_empty() || segment.contains('/') {
            return Err(StoreError::InvalidPath(segments.join("/")));
        }
    }
    Ok(segments.join("/"))
}

impl DocPath {
    pub fn new(segments: &[&str]) -> Result<Self, StoreError> {
        let path = join_segments(segments)?;
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(path));
        }
        Ok(Self(path))
    }

    pub fn analysis(uid: &str) -> Result<Self, StoreError> {
        Self::new(&["users", uid, "documents", "latest_analysis"])
    }

    pub fn timeline(uid: &str) -> Result<Self, StoreError> {
        Self::new(&["users", uid, "timelines", "latest_timeline"])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CollectionPath {
    pub fn new(segments: &[&str]) -> Result<Self, StoreError> {
        let path = join_segments(segments)?;
        if segments.len() % 2 != 1 {
            return Err(StoreError::InvalidPath(path));
        }
        Ok(Self(path))
    }

    pub fn chat_messages(uid: &str) -> Result<Self, StoreError> {
        Self::new(&["users", uid, "chats", "main_chat", "messages"])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Deep-merge objects into the existing document, creating it if absent.
    Merge,
    /// Overwrite the whole document.
    Replace,
}

/// A record of a collection as delivered in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub created_at: String,
    pub body: Value,
}

/// Full-snapshot feed for one path.
///
/// The first `next()` yields the current value immediately; later calls wait
/// for the next write. Snapshots written faster than they are consumed are
/// coalesced to the newest one. Dropping the subscription (or calling
/// `unsubscribe`) detaches the listener.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    primed: bool,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx, primed: false }
    }

    /// `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits for a value not yet seen. Returns `false` once the store has shut down.
    pub(crate) async fn changed(&mut self) -> bool {
        if !self.primed {
            self.primed = true;
            return true;
        }
        self.rx.changed().await.is_ok()
    }

    /// Runs `f` on the newest value while holding it, so the store cannot
    /// publish a newer snapshot until `f` returns.
    pub(crate) fn with_latest<R>(&mut self, f: impl FnOnce(&T) -> R) -> R {
        let latest = self.rx.borrow_and_update();
        f(&latest)
    }

    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|value| (value, sub))
        })
    }

    pub fn unsubscribe(self) {}
}

/// Realtime per-user key/value document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Creates the document if absent. The store stamps `updatedAt`.
    async fn upsert(&self, path: &DocPath, value: Value, mode: WriteMode)
        -> Result<(), StoreError>;

    async fn subscribe(&self, path: &DocPath) -> Result<Subscription<Option<Value>>, StoreError>;

    /// Appends a record and returns its generated id. The store stamps `createdAt`.
    async fn add(&self, path: &CollectionPath, value: Value) -> Result<String, StoreError>;

    /// Records ordered by creation time, oldest first.
    async fn list(&self, path: &CollectionPath) -> Result<Vec<StoredRecord>, StoreError>;

    async fn subscribe_collection(
        &self,
        path: &CollectionPath,
    ) -> Result<Subscription<Vec<StoredRecord>>, StoreError>;

    /// Number of live subscriptions on a document or collection path.
    fn listener_count(&self, path: &str) -> usize;
}

/// Recursively merges `patch` into `target`. Objects merge key by key; anything
/// else (arrays included) is replaced.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let nested = value.is_object() && existing.get(&key).is_some_and(Value::is_object);
                if !nested {
                    existing.insert(key, value);
                } else if let Some(slot) = existing.get_mut(&key) {
                    deep_merge(slot, value);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
