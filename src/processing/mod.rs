//! Address block processing logic.
//!
//! - [`partitioner`] - Deterministic splitting of a block into equal children
//! - [`overlap`] - Overlap and containment checks on allocated blocks

mod overlap;
mod partitioner;

// Re-export public functions
pub use overlap::{
    find_overlapping_blocks, log_overlapping_blocks, verify_allocation, OverlapConflict,
};
pub use partitioner::{
    partition, partition_cidr, split_at_prefix, PartitionRequest, PartitionResult,
};
