//! Overlapping block detection.
//!
//! Checks a set of allocated blocks against each other and against the
//! parent block they were carved from.

use crate::models::AddressBlock;
use itertools::Itertools;
use std::error::Error;

/// Two allocated blocks sharing addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    pub first: AddressBlock,
    pub second: AddressBlock,
}

/// Find every pair of overlapping blocks.
///
/// # Returns
/// Conflicts sorted by block, each pair with the lower block first.
pub fn find_overlapping_blocks(blocks: &[AddressBlock]) -> Vec<OverlapConflict> {
    let mut conflicts: Vec<OverlapConflict> = blocks
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.overlaps(b))
        .map(|(a, b)| OverlapConflict {
            first: *a.min(b),
            second: *a.max(b),
        })
        .collect();

    // Sort for consistent output
    conflicts.sort_by_key(|c| (c.first, c.second));
    conflicts
}

/// Log overlapping block conflicts as warnings.
pub fn log_overlapping_blocks(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping blocks found.");
        return;
    }

    log::warn!("Found {} overlapping block pair(s):", conflicts.len());
    for conflict in conflicts {
        log::warn!("  {} overlaps {}", conflict.first, conflict.second);
    }
}

/// Check that `blocks` all sit inside `base` and share no addresses.
///
/// # Returns
/// * `Ok(())` - The allocation is safe to hand to the provisioning engine
/// * `Err` - Naming the first block outside `base`, or every overlap
pub fn verify_allocation(
    base: AddressBlock,
    blocks: &[AddressBlock],
) -> Result<(), Box<dyn Error>> {
    if let Some(outside) = blocks.iter().find(|b| !b.is_subnet_of(&base)) {
        log::error!("Block {outside} is outside {base}");
        return Err(format!("Block {outside} is not within {base}").into());
    }

    let conflicts = find_overlapping_blocks(blocks);
    if !conflicts.is_empty() {
        log_overlapping_blocks(&conflicts);
        let pairs = conflicts
            .iter()
            .map(|c| format!("{}<>{}", c.first, c.second))
            .join(", ");
        return Err(format!("Overlapping blocks in {base}: {pairs}").into());
    }

    log::debug!("Verified {} blocks within {base}", blocks.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::partition;

    fn block(s: &str) -> AddressBlock {
        AddressBlock::new(s).unwrap()
    }

    #[test]
    fn test_find_overlapping_blocks() {
        let blocks = vec![
            block("10.0.64.0/19"),
            block("10.0.0.0/19"),
            block("10.0.70.0/24"),
            block("10.0.0.0/16"),
        ];
        let conflicts = find_overlapping_blocks(&blocks);
        assert_eq!(conflicts.len(), 4);
        assert_eq!(
            conflicts[0],
            OverlapConflict {
                first: block("10.0.0.0/16"),
                second: block("10.0.0.0/19"),
            }
        );
        assert_eq!(conflicts[3].first, block("10.0.64.0/19"));
        assert_eq!(conflicts[3].second, block("10.0.70.0/24"));
    }

    #[test]
    fn test_no_overlap_in_partition() {
        let base = block("10.0.0.0/16");
        let blocks = partition(base, 6).unwrap();
        assert!(find_overlapping_blocks(&blocks).is_empty());
        verify_allocation(base, &blocks).expect("partition output should verify");
    }

    #[test]
    fn test_verify_allocation_rejects() {
        let base = block("10.0.0.0/16");
        let err = verify_allocation(base, &[block("10.1.0.0/24")]).unwrap_err();
        assert_eq!(err.to_string(), "Block 10.1.0.0/24 is not within 10.0.0.0/16");

        let dup = [block("10.0.1.0/24"), block("10.0.1.0/24")];
        let err = verify_allocation(base, &dup).unwrap_err();
        assert!(err.to_string().contains("10.0.1.0/24<>10.0.1.0/24"), "{err}");
    }
}
