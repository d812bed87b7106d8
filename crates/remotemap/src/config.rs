//! Configuration for a remote map.

/// Configuration for a remote map.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    /// Key naming the remote hash. Generated at construction if absent.
    pub identifier: Option<String>,

    /// Key time-to-live in seconds, refreshed on every mutation.
    /// `None` means the key never expires through this map.
    pub ttl_seconds: Option<u64>,
}

impl MapConfig {
    /// Create a configuration with no identifier and no TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key naming the remote hash.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the key TTL in seconds.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    /// Disable expiration (the key persists until deleted).
    pub fn without_ttl(mut self) -> Self {
        self.ttl_seconds = None;
        self
    }
}
