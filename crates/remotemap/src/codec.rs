//! Value serialization for the wire.
//!
//! The map never stores raw values; everything passes through a [`Codec`]
//! on the way in and out. The default [`JsonCodec`] keeps the wire form
//! human-readable and type-preserving: a boolean decodes as a boolean,
//! never as an integer, and nesting is reconstructed exactly.

use crate::error::Result;
use crate::value::Value;

/// Encodes values to wire bytes and back.
///
/// Implementations must satisfy the round-trip law: for any value in the
/// supported domain, `decode(encode(v))` yields `v` with the same variant.
/// Decoding bytes the matching encoder never produced is out of contract.
pub trait Codec: Send + Sync {
    /// Encode a value to wire bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode wire bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
