//! Error types for CIDR partitioning.

use thiserror::Error;

/// Errors raised by [`crate::partition`] and the [`crate::models::AddressBlock`] parser.
///
/// None of these are transient: retrying with the same input gives the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// The block string is not valid CIDR notation.
    #[error("Invalid CIDR block '{input}': {reason}")]
    InvalidCidr { input: String, reason: String },

    /// The partition request itself is unusable (bad base or non-positive count).
    #[error("Invalid partition request base={base} count={count}: {reason}")]
    InvalidInput {
        base: String,
        count: usize,
        reason: String,
    },

    /// The base block is too small for `count` equal children.
    #[error(
        "Capacity exceeded: base={base} cannot hold count={count} blocks, \
         needs /{required_prefix_len} but the limit is /{max_prefix_len}"
    )]
    Capacity {
        base: String,
        count: usize,
        required_prefix_len: u32,
        max_prefix_len: u8,
    },
}

impl PartitionError {
    /// True for malformed blocks and bad counts.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PartitionError::InvalidCidr { .. } | PartitionError::InvalidInput { .. }
        )
    }

    /// True when the base block ran out of room.
    pub fn is_capacity(&self) -> bool {
        matches!(self, PartitionError::Capacity { .. })
    }
}
