pub mod models;
pub mod store;

pub use store::{
    deep_merge, CollectionPath, DocPath, DocumentStore, StoredRecord, Subscription, WriteMode,
};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}

impl Serialize for StoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Default)]
struct Channels {
    documents: HashMap<String, watch::Sender<Option<Value>>>,
    collections: HashMap<String, watch::Sender<Vec<StoredRecord>>>,
}

/// SQLite-backed realtime document store. Every committed write is pushed as
/// a full snapshot to the live subscribers of the written path.
pub struct Database {
    conn: Mutex<Connection>,
    channels: Mutex<Channels>,
}

fn server_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Self {
            conn: Mutex::new(conn),
            channels: Mutex::new(Channels::default()),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_collection
                ON records (collection, created_at, seq);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn channels(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Documents ──

    fn read_document(conn: &Connection, path: &str) -> Result<Option<Value>, StoreError> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b))
            .transpose()
            .map_err(StoreError::from)
    }

    fn write_document(
        &self,
        path: &DocPath,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        let mut next = match (mode, Self::read_document(&conn, path.as_str())?) {
            (WriteMode::Merge, Some(mut existing)) => {
                deep_merge(&mut existing, value);
                existing
            }
            _ => value,
        };
        let now = server_timestamp();
        if let Value::Object(map) = &mut next {
            map.insert("updatedAt".to_string(), Value::String(now.clone()));
        }
        conn.execute(
            "INSERT OR REPLACE INTO documents (path, body, updated_at) VALUES (?1, ?2, ?3)",
            params![path.as_str(), serde_json::to_string(&next)?, now],
        )?;
        // Publish under the connection lock so snapshots follow commit order.
        if let Some(tx) = self.channels().documents.get(path.as_str()) {
            tx.send_replace(Some(next));
        }
        debug!(path = %path, ?mode, "document written");
        Ok(())
    }

    // ── Collections ──

    fn read_collection(conn: &Connection, path: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, body, created_at FROM records WHERE collection = ?1 ORDER BY created_at ASC, seq ASC",
        )?;
        let rows = stmt.query_map(params![path], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, body, created_at) = row?;
            records.push(StoredRecord {
                id,
                created_at,
                body: serde_json::from_str(&body)?,
            });
        }
        Ok(records)
    }

    fn append_record(&self, path: &CollectionPath, mut value: Value) -> Result<String, StoreError> {
        let conn = self.conn();
        let id = uuid::Uuid::new_v4().to_string();
        let now = server_timestamp();
        if let Value::Object(map) = &mut value {
            map.insert("createdAt".to_string(), Value::String(now.clone()));
        }
        conn.execute(
            "INSERT INTO records (id, collection, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, path.as_str(), serde_json::to_string(&value)?, now],
        )?;
        if let Some(tx) = self.channels().collections.get(path.as_str()) {
            tx.send_replace(Self::read_collection(&conn, path.as_str())?);
        }
        debug!(path = %path, id = %id, "record appended");
        Ok(id)
    }

    fn open_document_feed(&self, path: &DocPath) -> Result<Subscription<Option<Value>>, StoreError> {
        let conn = self.conn();
        let mut channels = self.channels();
        let rx = match channels.documents.get(path.as_str()) {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(Self::read_document(&conn, path.as_str())?);
                channels.documents.insert(path.as_str().to_string(), tx);
                rx
            }
        };
        debug!(path = %path, "document subscription opened");
        Ok(Subscription::new(rx))
    }

    fn open_collection_feed(
        &self,
        path: &CollectionPath,
    ) -> Result<Subscription<Vec<StoredRecord>>, StoreError> {
        let conn = self.conn();
        let mut channels = self.channels();
        let rx = match channels.collections.get(path.as_str()) {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(Self::read_collection(&conn, path.as_str())?);
                channels.collections.insert(path.as_str().to_string(), tx);
                rx
            }
        };
        debug!(path = %path, "collection subscription opened");
        Ok(Subscription::new(rx))
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        Self::read_document(&self.conn(), path.as_str())
    }

    async fn upsert(
        &self,
        path: &DocPath,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.write_document(path, value, mode)
    }

    async fn subscribe(&self, path: &DocPath) -> Result<Subscription<Option<Value>>, StoreError> {
        self.open_document_feed(path)
    }

    async fn add(&self, path: &CollectionPath, value: Value) -> Result<String, StoreError> {
        self.append_record(path, value)
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<StoredRecord>, StoreError> {
        Self::read_collection(&self.conn(), path.as_str())
    }

    async fn subscribe_collection(
        &self,
        path: &CollectionPath,
    ) -> Result<Subscription<Vec<StoredRecord>>, StoreError> {
        self.open_collection_feed(path)
    }

    fn listener_count(&self, path: &str) -> usize {
        let channels = self.channels();
        channels
            .documents
            .get(path)
            .map(|tx| tx.receiver_count())
            .or_else(|| channels.collections.get(path).map(|tx| tx.receiver_count()))
            .unwrap_or(0)
    }
}
