//! Dictionary-style access to a remote hash structure.
//!
//! This crate provides a mapping facade over a hash kept in a remote
//! key-value store, with:
//! - One pipelined round trip per mutation, bulk or single-field
//! - Automatic key TTL refresh inside the same batch as each mutation
//! - A type-preserving value codec (strings, integers, booleans, nesting)
//! - A pluggable store client behind the [`HashStore`] trait
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use remotemap::{InMemoryStore, MapConfig, RemoteMap, Value};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let session = RemoteMap::with_store(
//!     MapConfig::new().with_ttl(3600),
//!     store,
//! );
//!
//! session.set("user", "alice")?;
//! session.update_many([("visits", 3), ("admin", 0)])?;
//! assert_eq!(session.get("user")?, Value::from("alice"));
//! # Ok::<(), remotemap::Error>(())
//! ```

mod batch;
mod client;
mod codec;
mod config;
mod error;
mod expiry;
mod map;
mod memory;
mod value;

pub use batch::{Batch, BatchCommand};
pub use client::HashStore;
pub use codec::{Codec, JsonCodec};
pub use config::MapConfig;
pub use error::{Error, Result};
pub use expiry::ExpiryTracker;
pub use map::RemoteMap;
pub use memory::{InMemoryStore, StoreStats};
pub use value::Value;
