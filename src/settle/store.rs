//! Durable recovery store - persistence contract for settlement records
//!
//! The store is the single source of truth for outstanding settlement
//! work: after a crash or reload, whatever it holds is exactly what still
//! needs to reach the ledger. Last-writer-wins is sufficient since one
//! controller instance per device is assumed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::settle::record::SessionRecord;

/// Key-value persistence for settlement records, keyed by record key.
pub trait RecoveryStore {
    /// Insert or replace a record under its key.
    fn put(&mut self, record: &SessionRecord) -> Result<()>;

    /// Look up a record by key.
    fn get(&self, key: &str) -> Result<Option<SessionRecord>>;

    /// Remove a record. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// All outstanding records, oldest first.
    fn list_pending(&self) -> Result<Vec<SessionRecord>>;
}

/// In-memory store for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecoveryStore for MemoryStore {
    fn put(&mut self, record: &SessionRecord) -> Result<()> {
        self.map.insert(record.key(), record.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<SessionRecord>> {
        Ok(self.map.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<SessionRecord>> {
        let mut records: Vec<_> = self
            .map
            .values()
            .filter(|r| r.status.is_outstanding())
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}

/// File-backed store: one JSON document holding the full key-record map,
/// rewritten atomically (temp file + rename) on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    map: HashMap<String, SessionRecord>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing records.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("reading recovery store {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("parsing recovery store {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole map out through a temp file and rename it into
    /// place, so a crash mid-write cannot corrupt the store.
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating store directory {}", parent.display()))?;
            }
        }
        let data = serde_json::to_string_pretty(&self.map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl RecoveryStore for JsonFileStore {
    fn put(&mut self, record: &SessionRecord) -> Result<()> {
        self.map.insert(record.key(), record.clone());
        self.flush()
    }

    fn get(&self, key: &str) -> Result<Option<SessionRecord>> {
        Ok(self.map.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.map.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<SessionRecord>> {
        let mut records: Vec<_> = self
            .map
            .values()
            .filter(|r| r.status.is_outstanding())
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settle::record::{SessionId, SessionStatus};
    use crate::types::FinalStats;

    fn record(id: u64) -> SessionRecord {
        SessionRecord::pending(
            Some(SessionId(id)),
            FinalStats {
                score: 100 * id as u32,
                level: 1,
                lines: 2,
            },
            0,
        )
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let rec = record(1);

        store.put(&rec).unwrap();
        assert_eq!(store.get(&rec.key()).unwrap(), Some(rec.clone()));

        store.delete(&rec.key()).unwrap();
        assert_eq!(store.get(&rec.key()).unwrap(), None);
    }

    #[test]
    fn test_list_pending_skips_claimed() {
        let mut store = MemoryStore::new();
        let mut a = record(1);
        a.created_at = 1;
        let mut b = record(2);
        b.created_at = 2;
        b.status = SessionStatus::Claimed;

        store.put(&a).unwrap();
        store.put(&b).unwrap();

        let pending = store.list_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].session_id, Some(SessionId(1)));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut store = MemoryStore::new();
        let mut rec = record(1);
        store.put(&rec).unwrap();

        rec.status = SessionStatus::Claimable;
        store.put(&rec).unwrap();

        assert_eq!(
            store.get(&rec.key()).unwrap().unwrap().status,
            SessionStatus::Claimable
        );
    }
}
