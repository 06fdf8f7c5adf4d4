use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::StoredAnswer;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue io: {0}")]
    Io(#[from] std::io::Error),
    #[error("queue serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One undelivered answer with its local key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub key: u64,
    pub answer: StoredAnswer,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_key: u64,
    entries: Vec<QueueEntry>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            next_key: 1,
            entries: Vec::new(),
        }
    }
}

/// Durable store of answers pending delivery. Opened once per process
/// lifetime and reused. Every mutation rewrites the snapshot file before
/// returning, and a write failure propagates to the caller: this store is
/// the last line of defense against lost answers.
pub struct OfflineQueue {
    path: PathBuf,
    snapshot: Snapshot,
}

impl OfflineQueue {
    /// Opens the store at `path`, loading any entries that survived a
    /// previous run. A missing file is a fresh, empty queue.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, QueueError> {
        let path = path.into();
        let snapshot = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Snapshot::default()
        };
        Ok(Self { path, snapshot })
    }

    /// Appends `answer` under a fresh auto-incremented key and persists.
    pub fn save_answer(&mut self, answer: StoredAnswer) -> Result<u64, QueueError> {
        let key = self.snapshot.next_key;
        self.snapshot.next_key += 1;
        self.snapshot.entries.push(QueueEntry { key, answer });
        self.persist()?;
        Ok(key)
    }

    /// Entries in insertion order.
    pub fn pending_answers(&self) -> &[QueueEntry] {
        &self.snapshot.entries
    }

    /// Removes one entry. Meant for a replayer after the server confirmed
    /// delivery.
    pub fn delete_answer(&mut self, key: u64) -> Result<(), QueueError> {
        self.snapshot.entries.retain(|entry| entry.key != key);
        self.persist()
    }

    pub fn clear_all_answers(&mut self) -> Result<(), QueueError> {
        self.snapshot.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), QueueError> {
        let json = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
