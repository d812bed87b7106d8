//! Expiry deadline tracking for key expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks absolute expiry deadlines per key.
///
/// A deadline is set when an expire command runs and is not refreshed by
/// reads; a key past its deadline is treated as gone.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    /// Expiry deadline for each key. Keys without an entry never expire.
    deadlines: HashMap<String, Instant>,
}

impl ExpiryTracker {
    /// Create a tracker with no deadlines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key's deadline to `seconds` from now, replacing any previous
    /// deadline.
    pub fn set(&mut self, key: &str, seconds: u64) {
        self.deadlines
            .insert(key.to_string(), Instant::now() + Duration::from_secs(seconds));
    }

    /// Check if a key is past its deadline.
    ///
    /// Keys with no deadline never expire.
    pub fn is_expired(&self, key: &str) -> bool {
        match self.deadlines.get(key) {
            None => false,
            Some(deadline) => Instant::now() >= *deadline,
        }
    }

    /// Drop a key's deadline, making it persistent again.
    pub fn remove(&mut self, key: &str) {
        self.deadlines.remove(key);
    }

    /// Number of keys with a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether no key has a deadline.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// The remaining time before a key expires, if it has a deadline in
    /// the future.
    pub fn remaining(&self, key: &str) -> Option<Duration> {
        self.deadlines
            .get(key)
            .and_then(|deadline| deadline.checked_duration_since(Instant::now()))
    }
}
