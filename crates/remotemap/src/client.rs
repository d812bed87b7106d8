//! Backing store trait for pluggable hash storage.
//!
//! This module defines the `HashStore` trait that allows different store
//! clients (a Redis connection, an in-memory store, a test double) to be
//! used interchangeably. Attaching a client that lacks part of the
//! capability surface is impossible by construction: the trait bound is
//! the capability check.

use crate::batch::Batch;
use crate::error::Result;

/// Trait for remote hash storage clients.
///
/// One `key` names one hash structure; each structure maps field names to
/// opaque byte values. Reads are individual round trips; mutations arrive
/// as a [`Batch`] and must be dispatched as a single round trip with
/// all-or-nothing semantics.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow sharing across
/// threads.
pub trait HashStore: Send + Sync {
    /// Get a field's raw bytes.
    ///
    /// Returns `Ok(None)` if the field or the key does not exist.
    fn field_get(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a field exists in the hash.
    fn field_exists(&self, key: &str, field: &str) -> Result<bool>;

    /// All field names, in the store's native order.
    ///
    /// The order carries no meaning but is stable across repeated calls
    /// with no intervening writes.
    fn field_names(&self, key: &str) -> Result<Vec<String>>;

    /// All field values, raw, in the store's native order.
    fn field_values(&self, key: &str) -> Result<Vec<Vec<u8>>>;

    /// All (field, value) pairs, raw, in the store's native order.
    fn all_fields(&self, key: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Whether the key exists at all.
    fn key_exists(&self, key: &str) -> Result<bool>;

    /// Delete the key and every field under it.
    ///
    /// Deleting an absent key is a no-op.
    fn key_delete(&self, key: &str) -> Result<()>;

    /// Number of fields under the key. Zero if the key does not exist.
    fn field_count(&self, key: &str) -> Result<u64>;

    /// Dispatch a batch of staged commands as one round trip.
    ///
    /// # Errors
    ///
    /// A failed batch is reported as a whole; implementations must not
    /// apply a prefix of the commands and then error.
    fn execute(&self, batch: Batch) -> Result<()>;
}
