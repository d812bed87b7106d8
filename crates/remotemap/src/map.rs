//! Dictionary-style facade over one remote hash structure.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::batch::Batch;
use crate::client::HashStore;
use crate::codec::{Codec, JsonCodec};
use crate::config::MapConfig;
use crate::error::{Error, Result};
use crate::value::Value;

/// Dictionary-style access to a remote hash structure.
///
/// Reads and writes go straight to the backing store; nothing is cached
/// locally. Every mutation is dispatched as one batch, and when a TTL is
/// configured the key's expiry is refreshed inside that same batch, so an
/// observer never sees fields updated with a stale expiry or the reverse.
///
/// The identifier naming the remote hash is fixed at construction: either
/// supplied through [`MapConfig`] or generated as a UUID on the spot. The
/// remote structure itself is only created by the first field write.
pub struct RemoteMap {
    /// Backing store client. Operations fail with [`Error::NoStore`]
    /// until one is attached.
    store: Option<Arc<dyn HashStore>>,

    /// Key naming the remote hash. Immutable after construction.
    identifier: String,

    /// Key TTL in seconds, refreshed on every mutating batch.
    ttl_seconds: Option<u64>,

    /// Value codec for the wire.
    codec: Arc<dyn Codec>,
}

impl RemoteMap {
    /// Create a detached map from a configuration.
    ///
    /// If the configuration carries no identifier, a fresh UUID is
    /// generated here, before any store traffic.
    pub fn new(config: MapConfig) -> Self {
        let identifier = config
            .identifier
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            store: None,
            identifier,
            ttl_seconds: config.ttl_seconds,
            codec: Arc::new(JsonCodec),
        }
    }

    /// Create a map attached to a backing store.
    pub fn with_store(config: MapConfig, store: Arc<dyn HashStore>) -> Self {
        let mut map = Self::new(config);
        map.store = Some(store);
        map
    }

    /// Replace the default JSON codec.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Attach a backing store to a detached map.
    pub fn attach(&mut self, store: Arc<dyn HashStore>) {
        self.store = Some(store);
    }

    /// Whether a backing store is attached.
    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    /// The key naming the remote hash.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The configured key TTL in seconds, if any.
    pub fn ttl_seconds(&self) -> Option<u64> {
        self.ttl_seconds
    }

    /// Resolve the attached store, failing before any remote call.
    fn store(&self) -> Result<&Arc<dyn HashStore>> {
        self.store.as_ref().ok_or(Error::NoStore)
    }

    /// Append the TTL refresh (if configured) and execute as one round
    /// trip. Empty batches are never dispatched.
    fn dispatch(&self, store: &Arc<dyn HashStore>, mut batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if let Some(seconds) = self.ttl_seconds {
            batch.expire(&self.identifier, seconds);
        }
        trace!(
            identifier = %self.identifier,
            commands = batch.len(),
            "dispatching batch"
        );
        store.execute(batch)
    }

    /// Get the value of a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] if the field does not exist.
    pub fn get(&self, field: &str) -> Result<Value> {
        let store = self.store()?;
        match store.field_get(&self.identifier, field)? {
            Some(bytes) => self.codec.decode(&bytes),
            None => Err(Error::FieldNotFound(field.to_string())),
        }
    }

    /// Set a field to a value.
    ///
    /// Creates the remote structure if this is the first write, and
    /// refreshes the key TTL in the same round trip.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let store = self.store()?;
        let field = field.into();
        let bytes = self.codec.encode(&value.into())?;

        let mut batch = Batch::new();
        batch.set_field(&self.identifier, field, bytes);
        self.dispatch(store, batch)
    }

    /// Delete a field. Deleting an absent field is not an error.
    ///
    /// Refreshes the key TTL in the same round trip.
    pub fn delete(&self, field: &str) -> Result<()> {
        let store = self.store()?;
        let mut batch = Batch::new();
        batch.delete_field(&self.identifier, field);
        self.dispatch(store, batch)
    }

    /// Number of fields currently in the remote structure.
    pub fn len(&self) -> Result<u64> {
        let store = self.store()?;
        store.field_count(&self.identifier)
    }

    /// Whether the remote structure has no fields.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether a field exists. No value is fetched or decoded.
    pub fn contains_field(&self, field: &str) -> Result<bool> {
        let store = self.store()?;
        store.field_exists(&self.identifier, field)
    }

    /// All field names, in the store's native order.
    ///
    /// The order carries no meaning; it is only stable across repeated
    /// calls with no intervening writes.
    pub fn field_names(&self) -> Result<Vec<String>> {
        let store = self.store()?;
        store.field_names(&self.identifier)
    }

    /// All field values, decoded. A full scan of the structure.
    pub fn values(&self) -> Result<Vec<Value>> {
        let store = self.store()?;
        store
            .field_values(&self.identifier)?
            .iter()
            .map(|bytes| self.codec.decode(bytes))
            .collect()
    }

    /// All (field, value) pairs, decoded. A full scan of the structure.
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        let store = self.store()?;
        store
            .all_fields(&self.identifier)?
            .into_iter()
            .map(|(name, bytes)| Ok((name, self.codec.decode(&bytes)?)))
            .collect()
    }

    /// Set multiple fields in one round trip.
    ///
    /// Accepts anything yielding (name, value) pairs: a `HashMap`, a
    /// `BTreeMap`, a `Vec` of tuples, or an array literal. The TTL
    /// refresh is staged once for the whole batch, not once per entry.
    pub fn update_many<S, V, I>(&self, entries: I) -> Result<()>
    where
        S: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (S, V)>,
    {
        let store = self.store()?;
        let mut batch = Batch::new();
        for (field, value) in entries {
            let bytes = self.codec.encode(&value.into())?;
            batch.set_field(&self.identifier, field, bytes);
        }
        debug!(
            identifier = %self.identifier,
            fields = batch.len(),
            "bulk update"
        );
        self.dispatch(store, batch)
    }

    /// Delete multiple fields in one round trip.
    pub fn delete_many<S, I>(&self, fields: I) -> Result<()>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let store = self.store()?;
        self.dispatch(store, self.stage_deletes(fields))
    }

    /// Stage multi-field deletion without executing it.
    ///
    /// The returned batch carries the deletes plus the TTL refresh, ready
    /// to be folded into a larger batch with [`Batch::append`] and
    /// dispatched by the caller in one round trip, possibly alongside
    /// commands for other structures.
    pub fn delete_many_deferred<S, I>(&self, fields: I) -> Result<Batch>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.store()?;
        let mut batch = self.stage_deletes(fields);
        if !batch.is_empty() {
            if let Some(seconds) = self.ttl_seconds {
                batch.expire(&self.identifier, seconds);
            }
        }
        Ok(batch)
    }

    fn stage_deletes<S, I>(&self, fields: I) -> Batch
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let mut batch = Batch::new();
        for field in fields {
            batch.delete_field(&self.identifier, field);
        }
        batch
    }

    /// Whether the remote structure currently exists.
    ///
    /// Never creates the structure as a side effect.
    pub fn exists(&self) -> Result<bool> {
        let store = self.store()?;
        store.key_exists(&self.identifier)
    }

    /// Remove the entire remote structure: all fields and the key itself.
    ///
    /// The identifier is retained; a later write recreates the structure
    /// under the same key.
    pub fn clear(&self) -> Result<()> {
        let store = self.store()?;
        debug!(identifier = %self.identifier, "clearing structure");
        store.key_delete(&self.identifier)
    }
}

impl fmt::Debug for RemoteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteMap")
            .field("identifier", &self.identifier)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("attached", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchCommand;
    use crate::memory::InMemoryStore;
    use std::collections::HashMap;

    const SESSION_KEY: &str = "test_session_key";

    fn attached() -> (Arc<InMemoryStore>, RemoteMap) {
        let store = Arc::new(InMemoryStore::new());
        let map = RemoteMap::with_store(
            MapConfig::new().with_identifier(SESSION_KEY),
            store.clone(),
        );
        (store, map)
    }

    fn attached_with_ttl(seconds: u64) -> (Arc<InMemoryStore>, RemoteMap) {
        let store = Arc::new(InMemoryStore::new());
        let map = RemoteMap::with_store(
            MapConfig::new().with_identifier(SESSION_KEY).with_ttl(seconds),
            store.clone(),
        );
        (store, map)
    }

    #[test]
    fn test_detached_map_errors_without_store_traffic() {
        let store = Arc::new(InMemoryStore::new());
        let map = RemoteMap::new(MapConfig::new().with_identifier(SESSION_KEY));

        assert!(matches!(map.get("A"), Err(Error::NoStore)));
        assert!(matches!(map.set("A", "x"), Err(Error::NoStore)));
        assert!(matches!(map.delete("A"), Err(Error::NoStore)));
        assert!(matches!(map.len(), Err(Error::NoStore)));
        assert!(matches!(map.contains_field("A"), Err(Error::NoStore)));
        assert!(matches!(map.field_names(), Err(Error::NoStore)));
        assert!(matches!(map.values(), Err(Error::NoStore)));
        assert!(matches!(map.items(), Err(Error::NoStore)));
        assert!(matches!(
            map.update_many([("A", "x")]),
            Err(Error::NoStore)
        ));
        assert!(matches!(map.delete_many(["A"]), Err(Error::NoStore)));
        assert!(matches!(
            map.delete_many_deferred(["A"]),
            Err(Error::NoStore)
        ));
        assert!(matches!(map.exists(), Err(Error::NoStore)));
        assert!(matches!(map.clear(), Err(Error::NoStore)));

        // The store never saw a single call
        let stats = store.stats();
        assert_eq!(stats.reads, 0);
        assert_eq!(stats.batches_executed, 0);
    }

    #[test]
    fn test_attach_later() {
        let store = Arc::new(InMemoryStore::new());
        let mut map = RemoteMap::new(MapConfig::new().with_identifier(SESSION_KEY));
        assert!(!map.is_attached());

        map.attach(store.clone());
        assert!(map.is_attached());
        map.set("A", "ValueA").unwrap();
        assert_eq!(map.get("A").unwrap(), Value::from("ValueA"));
    }

    #[test]
    fn test_generated_identifiers_are_unique() {
        let first = RemoteMap::new(MapConfig::new());
        let second = RemoteMap::new(MapConfig::new());

        assert!(!first.identifier().is_empty());
        assert!(!second.identifier().is_empty());
        assert_ne!(first.identifier(), second.identifier());
    }

    #[test]
    fn test_set_then_get() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();

        assert_eq!(map.get("A").unwrap(), Value::from("ValueA"));
    }

    #[test]
    fn test_value_types_survive_storage() {
        let (_, map) = attached();
        map.set("s", "text").unwrap();
        map.set("n", 999).unwrap();
        map.set("b", true).unwrap();

        assert_eq!(map.get("s").unwrap(), Value::from("text"));
        assert_eq!(map.get("n").unwrap(), Value::from(999));
        // A stored boolean comes back as a boolean, not an integer
        assert_eq!(map.get("b").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_get_missing_field() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();

        match map.get("B") {
            Err(Error::FieldNotFound(name)) => assert_eq!(name, "B"),
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_field() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();
        map.set("B", "ValueB").unwrap();
        assert_eq!(map.len().unwrap(), 2);

        map.delete("B").unwrap();
        assert_eq!(map.len().unwrap(), 1);
        assert!(!map.contains_field("B").unwrap());
    }

    #[test]
    fn test_delete_missing_field_is_ok() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();

        map.delete("B").unwrap();
        assert_eq!(map.len().unwrap(), 1);
    }

    #[test]
    fn test_len_and_enumeration() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();
        map.set("B", "ValueB").unwrap();

        assert_eq!(map.len().unwrap(), 2);
        assert!(!map.is_empty().unwrap());

        let mut names = map.field_names().unwrap();
        names.sort();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);

        let mut items = map.items().unwrap();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            items,
            vec![
                ("A".to_string(), Value::from("ValueA")),
                ("B".to_string(), Value::from("ValueB")),
            ]
        );

        let mut values = map.values().unwrap();
        values.sort_by_key(|v| v.as_str().map(str::to_string));
        assert_eq!(values, vec![Value::from("ValueA"), Value::from("ValueB")]);
    }

    #[test]
    fn test_contains_field() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();

        assert!(map.contains_field("A").unwrap());
        assert!(!map.contains_field("B").unwrap());
    }

    #[test]
    fn test_update_many_from_map() {
        let (store, map) = attached();
        let mut entries = HashMap::new();
        entries.insert("A".to_string(), Value::from("x"));
        entries.insert("B".to_string(), Value::from("y"));

        map.update_many(entries).unwrap();

        assert_eq!(map.get("A").unwrap(), Value::from("x"));
        assert_eq!(map.get("B").unwrap(), Value::from("y"));
        // All entries went out in a single dispatch
        assert_eq!(store.stats().batches_executed, 1);
    }

    #[test]
    fn test_update_many_from_pairs() {
        let (store, map) = attached();
        map.update_many([("A", "x"), ("B", "y"), ("C", "z")]).unwrap();

        assert_eq!(map.len().unwrap(), 3);
        assert_eq!(store.stats().batches_executed, 1);
    }

    #[test]
    fn test_update_many_empty_is_free() {
        let (store, map) = attached();
        map.update_many(Vec::<(String, Value)>::new()).unwrap();

        assert_eq!(store.stats().batches_executed, 0);
        assert_eq!(store.stats().reads, 0);
    }

    #[test]
    fn test_delete_many() {
        let (store, map) = attached();
        map.update_many([("A", "x"), ("B", "y")]).unwrap();
        assert_eq!(map.len().unwrap(), 2);

        map.delete_many(["A", "B"]).unwrap();
        assert_eq!(map.len().unwrap(), 0);
        assert_eq!(store.stats().batches_executed, 2);
    }

    #[test]
    fn test_delete_many_empty_is_free() {
        let (store, map) = attached();
        map.delete_many(Vec::<String>::new()).unwrap();

        assert_eq!(store.stats().batches_executed, 0);
    }

    #[test]
    fn test_delete_many_deferred_stages_without_dispatch() {
        let (store, map) = attached_with_ttl(30);
        map.update_many([("A", "x"), ("B", "y")]).unwrap();
        let executed_before = store.stats().batches_executed;

        let batch = map.delete_many_deferred(["A", "B"]).unwrap();

        // Nothing dispatched yet; the batch carries deletes plus refresh
        assert_eq!(store.stats().batches_executed, executed_before);
        assert_eq!(batch.len(), 3);

        // Fold into a larger caller-owned batch and dispatch once
        let mut composed = Batch::new();
        composed.set_field("another_key", "Z", b"\"z\"".to_vec());
        composed.append(batch);
        store.execute(composed).unwrap();

        assert_eq!(map.len().unwrap(), 0);
        assert_eq!(store.stats().batches_executed, executed_before + 1);
    }

    #[test]
    fn test_exists_lifecycle() {
        let (_, map) = attached();
        assert!(!map.exists().unwrap());

        map.set("A", "ValueA").unwrap();
        assert!(map.exists().unwrap());

        map.clear().unwrap();
        assert!(!map.exists().unwrap());
    }

    #[test]
    fn test_clear_keeps_handle_reusable() {
        let (_, map) = attached();
        map.set("A", "ValueA").unwrap();
        map.clear().unwrap();

        assert_eq!(map.identifier(), SESSION_KEY);
        map.set("B", "ValueB").unwrap();
        assert!(map.exists().unwrap());
        assert_eq!(map.len().unwrap(), 1);
    }

    #[test]
    fn test_two_maps_are_independent() {
        let store = Arc::new(InMemoryStore::new());
        let first = RemoteMap::with_store(
            MapConfig::new().with_identifier("session_key_1"),
            store.clone(),
        );
        let second = RemoteMap::with_store(
            MapConfig::new().with_identifier("session_key_2"),
            store.clone(),
        );

        first.set("A", "ValueA").unwrap();
        second.set("Z", "ValueZ").unwrap();

        assert!(first.exists().unwrap());
        assert!(second.exists().unwrap());
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["session_key_1", "session_key_2"]);
    }

    #[test]
    fn test_set_refreshes_ttl_in_same_batch() {
        let (store, map) = attached_with_ttl(30);
        map.set("A", "ValueA").unwrap();

        let batch = store.last_batch();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0], BatchCommand::SetField { .. }));
        assert!(matches!(batch[1], BatchCommand::Expire { seconds: 30, .. }));
    }

    #[test]
    fn test_delete_refreshes_ttl_in_same_batch() {
        let (store, map) = attached_with_ttl(30);
        map.set("A", "ValueA").unwrap();
        map.delete("A").unwrap();

        let batch = store.last_batch();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0], BatchCommand::DeleteField { .. }));
        assert!(matches!(batch[1], BatchCommand::Expire { seconds: 30, .. }));
    }

    #[test]
    fn test_update_many_refreshes_ttl_once() {
        let (store, map) = attached_with_ttl(60);
        map.update_many([("A", "x"), ("B", "y"), ("C", "z")]).unwrap();

        let batch = store.last_batch();
        assert_eq!(batch.len(), 4);
        let refreshes = batch
            .iter()
            .filter(|cmd| matches!(cmd, BatchCommand::Expire { seconds: 60, .. }))
            .count();
        assert_eq!(refreshes, 1);
        assert!(matches!(batch[3], BatchCommand::Expire { .. }));
    }

    #[test]
    fn test_no_ttl_means_no_expire_commands() {
        let (store, map) = attached();
        map.set("A", "ValueA").unwrap();

        let batch = store.last_batch();
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch[0], BatchCommand::SetField { .. }));
        assert!(store.ttl_remaining(SESSION_KEY).is_none());
    }

    #[test]
    fn test_nested_values_roundtrip_through_store() {
        let (_, map) = attached();
        let mut inner = std::collections::BTreeMap::new();
        inner.insert("AA".to_string(), Value::from(1));
        inner.insert("BB".to_string(), Value::from(2));
        let nested = Value::Map(inner);

        map.set("A", nested.clone()).unwrap();
        assert_eq!(map.get("A").unwrap(), nested);
    }

    #[test]
    fn test_debug_omits_store_internals() {
        let map = RemoteMap::new(
            MapConfig::new().with_identifier(SESSION_KEY).with_ttl(30),
        );
        let repr = format!("{map:?}");
        assert!(repr.contains(SESSION_KEY));
        assert!(repr.contains("30"));
        assert!(repr.contains("attached: false"));
    }
}
