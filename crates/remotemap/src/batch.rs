//! Command batching for single-round-trip dispatch.
//!
//! Mutations are staged locally as [`BatchCommand`]s and handed to the
//! store in one [`Batch`], so a field write and its TTL refresh (or a
//! hundred bulk writes) cost one round trip. The store executes a batch
//! all-or-nothing per its own pipeline semantics.

/// A single stageable store command.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchCommand {
    /// Set a hash field to already-encoded bytes.
    SetField {
        key: String,
        field: String,
        value: Vec<u8>,
    },

    /// Delete a hash field. Deleting an absent field is a no-op.
    DeleteField { key: String, field: String },

    /// Set the key's expiry, in seconds from now.
    Expire { key: String, seconds: u64 },
}

/// An ordered set of staged commands dispatched as one round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    commands: Vec<BatchCommand>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a field write.
    pub fn set_field(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: Vec<u8>,
    ) -> &mut Self {
        self.commands.push(BatchCommand::SetField {
            key: key.into(),
            field: field.into(),
            value,
        });
        self
    }

    /// Stage a field deletion.
    pub fn delete_field(&mut self, key: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.commands.push(BatchCommand::DeleteField {
            key: key.into(),
            field: field.into(),
        });
        self
    }

    /// Stage an expiry refresh.
    pub fn expire(&mut self, key: impl Into<String>, seconds: u64) -> &mut Self {
        self.commands.push(BatchCommand::Expire {
            key: key.into(),
            seconds,
        });
        self
    }

    /// Fold another batch's commands onto the end of this one.
    ///
    /// Lets a caller collect deferred batches from several maps and
    /// dispatch everything in a single round trip.
    pub fn append(&mut self, other: Batch) -> &mut Self {
        self.commands.extend(other.commands);
        self
    }

    /// Number of staged commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the batch has no staged commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The staged commands, in staging order.
    pub fn commands(&self) -> &[BatchCommand] {
        &self.commands
    }

    /// Consume the batch, yielding the staged commands.
    pub fn into_commands(self) -> Vec<BatchCommand> {
        self.commands
    }
}
