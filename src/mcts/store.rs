//! Key-value collaborator holding [`NodeStats`] records.
//!
//! Records are keyed by [`BoardState::key`](crate::data_model::BoardState::key)
//! and stored as JSON text, the same shape an external key-value server would
//! hold them in.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::stats::NodeStats;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for per-position statistics.
///
/// `get` distinguishes a missing record (`Ok(None)`) from a failed lookup.
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<NodeStats>, StoreError>;

    async fn set(&self, key: &str, stats: &NodeStats) -> Result<(), StoreError>;

    /// Adds one visit and `outcome` to the record under `key` in a single
    /// step and returns the updated record. `base` stands in for a missing
    /// record; its `on_tree` flag and `node_value` are merged into an
    /// existing one.
    async fn accumulate(
        &self,
        key: &str,
        base: &NodeStats,
        outcome: i64,
    ) -> Result<NodeStats, StoreError>;
}

/// In-process store backed by a map of JSON records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("record map lock poisoned".to_string()))
    }

    /// Stores raw record text without validation.
    pub fn insert_raw(&self, key: &str, record: &str) -> Result<(), StoreError> {
        self.records()?.insert(key.to_string(), record.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a snapshot written by [`MemoryStore::save_snapshot`]. A missing
    /// file yields an empty store.
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)?;
        let records: HashMap<String, String> = serde_json::from_str(&text)?;
        debug!(path = %path.display(), records = records.len(), "loaded snapshot");
        Ok(Self {
            records: Mutex::new(records),
        })
    }

    /// Writes every record to `path` as one JSON object, sorted by key.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let sorted: BTreeMap<String, String> = self
            .records()?
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&sorted)?)?;
        debug!(path = %path.display(), records = sorted.len(), "saved snapshot");
        Ok(())
    }
}

fn parse_record(key: &str, record: &str) -> Result<NodeStats, StoreError> {
    serde_json::from_str(record).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<NodeStats>, StoreError> {
        let records = self.records()?;
        records
            .get(key)
            .map(|record| parse_record(key, record))
            .transpose()
    }

    async fn set(&self, key: &str, stats: &NodeStats) -> Result<(), StoreError> {
        let record = serde_json::to_string(stats)?;
        self.records()?.insert(key.to_string(), record);
        Ok(())
    }

    async fn accumulate(
        &self,
        key: &str,
        base: &NodeStats,
        outcome: i64,
    ) -> Result<NodeStats, StoreError> {
        let mut records = self.records()?;
        let mut stats = match records.get(key).map(|record| parse_record(key, record)) {
            Some(Ok(mut existing)) => {
                existing.on_tree |= base.on_tree;
                existing.node_value = existing.node_value.or(base.node_value);
                existing
            }
            Some(Err(err)) => {
                warn!(%err, "replacing corrupt record during backpropagation");
                base.clone()
            }
            None => base.clone(),
        };
        stats.record(outcome);
        records.insert(key.to_string(), serde_json::to_string(&stats)?);
        Ok(stats)
    }
}
