//! In-memory hash store.
//!
//! A complete [`HashStore`] kept in process memory, used as the test
//! double for the map and as a lightweight local backend. Field order is
//! insertion order; keys honor expiry deadlines the way a real store
//! would (an expired key reads as absent). Every call is counted so tests
//! can assert how many round trips an operation cost.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use crate::batch::{Batch, BatchCommand};
use crate::client::HashStore;
use crate::error::Result;
use crate::expiry::ExpiryTracker;

/// Call counters for one store instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    /// Single-command read round trips served.
    pub reads: u64,

    /// Batches dispatched via `execute`.
    pub batches_executed: u64,

    /// Total commands applied across all batches.
    pub commands_applied: u64,
}

/// Inner state protected by Mutex.
#[derive(Debug, Default)]
struct StoreInner {
    /// Field pairs per key, in insertion order.
    hashes: HashMap<String, Vec<(String, Vec<u8>)>>,

    /// Expiry deadlines per key.
    expiry: ExpiryTracker,

    /// Call counters.
    stats: StoreStats,

    /// Commands of the most recently executed batch.
    last_batch: Vec<BatchCommand>,
}

impl StoreInner {
    /// Drop a key whose deadline has passed.
    fn purge_expired(&mut self, key: &str) {
        if self.expiry.is_expired(key) {
            self.hashes.remove(key);
            self.expiry.remove(key);
        }
    }

    fn apply(&mut self, command: BatchCommand) {
        match command {
            BatchCommand::SetField { key, field, value } => {
                self.purge_expired(&key);
                let fields = self.hashes.entry(key).or_default();
                match fields.iter_mut().find(|(name, _)| *name == field) {
                    Some(entry) => entry.1 = value,
                    None => fields.push((field, value)),
                }
            }
            BatchCommand::DeleteField { key, field } => {
                self.purge_expired(&key);
                let now_empty = match self.hashes.get_mut(&key) {
                    Some(fields) => {
                        fields.retain(|(name, _)| *name != field);
                        fields.is_empty()
                    }
                    None => false,
                };
                // A hash with no fields ceases to exist
                if now_empty {
                    self.hashes.remove(&key);
                    self.expiry.remove(&key);
                }
            }
            BatchCommand::Expire { key, seconds } => {
                self.purge_expired(&key);
                if self.hashes.contains_key(&key) {
                    self.expiry.set(&key, seconds);
                }
            }
        }
        self.stats.commands_applied += 1;
    }
}

/// In-memory [`HashStore`] with call-count instrumentation.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats.clone()
    }

    /// Commands of the most recently executed batch, in staging order.
    pub fn last_batch(&self) -> Vec<BatchCommand> {
        self.inner.lock().last_batch.clone()
    }

    /// All live keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        let keys: Vec<String> = inner.hashes.keys().cloned().collect();
        keys.into_iter()
            .filter(|key| {
                inner.purge_expired(key);
                inner.hashes.contains_key(key)
            })
            .collect()
    }

    /// Remaining time before a key expires, if it has a deadline.
    pub fn ttl_remaining(&self, key: &str) -> Option<std::time::Duration> {
        self.inner.lock().expiry.remaining(key)
    }
}

impl HashStore for InMemoryStore {
    fn field_get(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner.hashes.get(key).and_then(|fields| {
            fields
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value.clone())
        }))
    }

    fn field_exists(&self, key: &str, field: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner
            .hashes
            .get(key)
            .is_some_and(|fields| fields.iter().any(|(name, _)| name == field)))
    }

    fn field_names(&self, key: &str) -> Result<Vec<String>> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner
            .hashes
            .get(key)
            .map(|fields| fields.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    fn field_values(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner
            .hashes
            .get(key)
            .map(|fields| fields.iter().map(|(_, value)| value.clone()).collect())
            .unwrap_or_default())
    }

    fn all_fields(&self, key: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }

    fn key_exists(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner.hashes.contains_key(key))
    }

    fn key_delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.hashes.remove(key);
        inner.expiry.remove(key);
        Ok(())
    }

    fn field_count(&self, key: &str) -> Result<u64> {
        let mut inner = self.inner.lock();
        inner.stats.reads += 1;
        inner.purge_expired(key);
        Ok(inner
            .hashes
            .get(key)
            .map(|fields| fields.len() as u64)
            .unwrap_or(0))
    }

    fn execute(&self, batch: Batch) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.stats.batches_executed += 1;
        let commands = batch.into_commands();
        trace!(commands = commands.len(), "executing batch");
        inner.last_batch = commands.clone();
        for command in commands {
            inner.apply(command);
        }
        Ok(())
    }
}
