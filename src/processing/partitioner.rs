//! Deterministic CIDR block partitioning.
//!
//! Splits one base block into `count` equal, non-overlapping children in
//! ascending address order. Children past `count` stay implicitly reserved,
//! so appending a role later never renumbers the blocks already handed out.

use crate::error::PartitionError;
use crate::models::{addr_to_bits, AddressBlock};

/// A base block, how many children to cut from it, and an optional
/// minimum-usable-block policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRequest {
    pub base: AddressBlock,
    pub count: usize,
    /// Longest prefix a child may have. Defaults to the family maximum.
    pub max_prefix_len: Option<u8>,
}

/// Ordered children of a successful [`PartitionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionResult {
    pub base: AddressBlock,
    pub child_prefix_len: u8,
    pub blocks: Vec<AddressBlock>,
}

impl PartitionRequest {
    pub fn new(base: AddressBlock, count: usize) -> PartitionRequest {
        PartitionRequest {
            base,
            count,
            max_prefix_len: None,
        }
    }

    /// Refuse children longer than `/len`, e.g. /30 for OCI subnets.
    pub fn with_max_prefix_len(mut self, len: u8) -> PartitionRequest {
        self.max_prefix_len = Some(len);
        self
    }

    fn prefix_limit(&self) -> u8 {
        let family_max = self.base.family().max_length();
        self.max_prefix_len.map_or(family_max, |len| len.min(family_max))
    }

    /// Prefix length of the children: base prefix plus the smallest `k`
    /// with `2^k >= count`.
    pub fn child_prefix_len(&self) -> Result<u8, PartitionError> {
        if self.count == 0 {
            return Err(PartitionError::InvalidInput {
                base: self.base.to_string(),
                count: self.count,
                reason: "count must be positive".to_string(),
            });
        }
        let required = required_prefix_len(self.base, self.count);
        let limit = self.prefix_limit();
        if required > u32::from(limit) {
            return Err(PartitionError::Capacity {
                base: self.base.to_string(),
                count: self.count,
                required_prefix_len: required,
                max_prefix_len: limit,
            });
        }
        Ok(required as u8)
    }

    pub fn partition(&self) -> Result<PartitionResult, PartitionError> {
        let child_prefix_len = self.child_prefix_len()?;
        let blocks: Vec<AddressBlock> = child_blocks(self.base, child_prefix_len, 0)
            .take(self.count)
            .collect();
        log::debug!(
            "partition {} x {} => {} blocks of /{}",
            self.base,
            self.count,
            blocks.len(),
            child_prefix_len
        );
        Ok(PartitionResult {
            base: self.base,
            child_prefix_len,
            blocks,
        })
    }
}

impl PartitionResult {
    /// Number of equal children the base holds at this prefix length (`2^k`).
    pub fn capacity(&self) -> u128 {
        let k = u32::from(self.child_prefix_len - self.base.mask());
        1u128.checked_shl(k).unwrap_or(u128::MAX)
    }

    /// Children that exist in the address space but were not allocated.
    pub fn reserved(&self) -> impl Iterator<Item = AddressBlock> + '_ {
        let unused = self.capacity() - self.blocks.len() as u128;
        child_blocks(self.base, self.child_prefix_len, self.blocks.len() as u128)
            .take(usize::try_from(unused).unwrap_or(usize::MAX))
    }

    pub fn to_cidr_strings(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.to_string()).collect()
    }
}

/// Base prefix plus the smallest `k` with `2^k >= count`; may exceed the family maximum.
fn required_prefix_len(base: AddressBlock, count: usize) -> u32 {
    let k = count
        .checked_next_power_of_two()
        .map_or(usize::BITS, |n| n.trailing_zeros());
    u32::from(base.mask()) + k
}

/// Children of `base` at `child_prefix_len`, ascending, starting at `first`.
fn child_blocks(
    base: AddressBlock,
    child_prefix_len: u8,
    first: u128,
) -> impl Iterator<Item = AddressBlock> {
    let family = base.family();
    let host_bits = u32::from(family.max_length() - child_prefix_len);
    let step = 1u128.checked_shl(host_bits).unwrap_or(0);
    let k = u32::from(child_prefix_len - base.mask());
    let end = 1u128.checked_shl(k).unwrap_or(u128::MAX);
    let base_bits = addr_to_bits(base.addr());
    (first..end).map(move |index| {
        AddressBlock::from_bits(family, base_bits + index * step, child_prefix_len)
    })
}

/// Split `base` into `count` ascending, non-overlapping blocks.
pub fn partition(base: AddressBlock, count: usize) -> Result<Vec<AddressBlock>, PartitionError> {
    Ok(PartitionRequest::new(base, count).partition()?.blocks)
}

/// String form of [`partition`]: CIDR in, CIDR strings out.
///
/// # Examples
/// ```
/// use vcn_subnet_planner::partition_cidr;
/// let subnets = partition_cidr("10.0.0.0/16", 6).unwrap();
/// assert_eq!(subnets[1], "10.0.32.0/19");
/// ```
pub fn partition_cidr(base_cidr: &str, count: usize) -> Result<Vec<String>, PartitionError> {
    let base = AddressBlock::new(base_cidr).map_err(|e| PartitionError::InvalidInput {
        base: base_cidr.trim().to_string(),
        count,
        reason: e.to_string(),
    })?;
    Ok(PartitionRequest::new(base, count).partition()?.to_cidr_strings())
}

/// Cut the first `count` blocks of a fixed size out of `base`.
///
/// Unlike [`partition`] the child size does not depend on `count`, so the
/// first `n` blocks are the same for every `count >= n`.
pub fn split_at_prefix(
    base: AddressBlock,
    count: usize,
    child_prefix_len: u8,
) -> Result<Vec<AddressBlock>, PartitionError> {
    let invalid = |reason: String| PartitionError::InvalidInput {
        base: base.to_string(),
        count,
        reason,
    };
    if count == 0 {
        return Err(invalid("count must be positive".to_string()));
    }
    if child_prefix_len < base.mask() || child_prefix_len > base.family().max_length() {
        return Err(invalid(format!(
            "child prefix /{child_prefix_len} must be between /{} and /{}",
            base.mask(),
            base.family().max_length()
        )));
    }
    let available = 1u128.checked_shl(u32::from(child_prefix_len - base.mask()));
    if available.is_some_and(|n| count as u128 > n) {
        return Err(PartitionError::Capacity {
            base: base.to_string(),
            count,
            required_prefix_len: required_prefix_len(base, count),
            max_prefix_len: child_prefix_len,
        });
    }
    Ok(child_blocks(base, child_prefix_len, 0).take(count).collect())
}
