//! IP address block and CIDR notation utilities.
//!
//! Provides [`AddressBlock`] for IPv4 and IPv6 ranges, along with the
//! bit-level helpers used for subnet calculations. Both families are
//! handled as `u128` with the family width tracked alongside.

use crate::error::PartitionError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum prefix length for an IPv4 block (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 block (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Addresses OCI keeps for itself in every subnet (first two and last).
const OCI_RESERVED_ADDRESSES: u128 = 3;

/// IP address family, bounding valid prefix lengths.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(addr: IpAddr) -> AddressFamily {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Number of bits in an address of this family.
    pub fn max_length(self) -> u8 {
        match self {
            AddressFamily::V4 => MAX_LENGTH_V4,
            AddressFamily::V6 => MAX_LENGTH_V6,
        }
    }

    fn width_mask(self) -> u128 {
        match self {
            AddressFamily::V4 => u32::MAX as u128,
            AddressFamily::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Address as an unsigned integer, IPv4 in the low 32 bits.
pub fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(a) => u32::from(a) as u128,
        IpAddr::V6(a) => u128::from(a),
    }
}

/// Inverse of [`addr_to_bits`]. Bits above the family width are dropped.
pub fn bits_to_addr(family: AddressFamily, bits: u128) -> IpAddr {
    match family {
        AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

fn check_length(family: AddressFamily, len: u8) -> Result<(), PartitionError> {
    if len > family.max_length() {
        Err(PartitionError::InvalidCidr {
            input: format!("/{len}"),
            reason: format!("Network length is too long for {family}"),
        })
    } else {
        Ok(())
    }
}

/// Mask selecting the host part of a `len` prefix.
fn host_mask(family: AddressFamily, len: u8) -> u128 {
    let host_bits = u32::from(family.max_length() - len);
    if host_bits >= 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    }
}

/// Convert a CIDR prefix length to a network mask.
///
/// # Examples
/// ```
/// use vcn_subnet_planner::models::{get_cidr_mask, AddressFamily};
/// assert_eq!(get_cidr_mask(AddressFamily::V4, 24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(family: AddressFamily, len: u8) -> Result<u128, PartitionError> {
    check_length(family, len)?;
    Ok(family.width_mask() & !host_mask(family, len))
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: IpAddr, len: u8) -> Result<IpAddr, PartitionError> {
    let family = AddressFamily::of(addr);
    let mask = get_cidr_mask(family, len)?;
    Ok(bits_to_addr(family, addr_to_bits(addr) & mask))
}

/// Calculate the last address of the block containing `addr`.
pub fn broadcast_addr(addr: IpAddr, len: u8) -> Result<IpAddr, PartitionError> {
    let family = AddressFamily::of(addr);
    let mask = get_cidr_mask(family, len)?;
    let network_bits = addr_to_bits(addr) & mask;
    Ok(bits_to_addr(family, network_bits | host_mask(family, len)))
}

/// Returns the first address following the block containing `addr`.
pub fn ip_after_subnet(addr: IpAddr, len: u8) -> Result<IpAddr, PartitionError> {
    let family = AddressFamily::of(addr);
    let mask = get_cidr_mask(family, len)?;
    let overflow = || PartitionError::InvalidCidr {
        input: format!("{addr}/{len}"),
        reason: "Next block calculation overflowed".to_string(),
    };
    let block_size = host_mask(family, len).checked_add(1).ok_or_else(overflow)?;
    let next_bits = (addr_to_bits(addr) & mask)
        .checked_add(block_size)
        .filter(|bits| *bits <= family.width_mask())
        .ok_or_else(overflow)?;
    Ok(bits_to_addr(family, next_bits))
}

/// Contiguous IP range in CIDR notation.
///
/// The network address is always canonical: constructors reject host bits.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct AddressBlock {
    addr: IpAddr,
    mask: u8,
}

impl AddressBlock {
    /// Create a new [`AddressBlock`] from a CIDR string (e.g., "10.0.0.0/16").
    pub fn new(addr_cidr: &str) -> Result<AddressBlock, PartitionError> {
        let addr_cidr = addr_cidr.trim();
        let invalid = |reason: String| PartitionError::InvalidCidr {
            input: addr_cidr.to_string(),
            reason,
        };
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| invalid("Invalid address/mask".to_string()))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| invalid(format!("Invalid address {addr}")))?;
        let digits_only = !mask.is_empty() && mask.bytes().all(|b| b.is_ascii_digit());
        if !digits_only || (mask.len() > 1 && mask.starts_with('0')) {
            return Err(invalid(format!("Invalid prefix length {mask}")));
        }
        let mask: u8 = mask
            .parse()
            .map_err(|_| invalid(format!("Invalid prefix length {mask}")))?;
        AddressBlock::from_parts(addr, mask).map_err(|e| match e {
            PartitionError::InvalidCidr { reason, .. } => invalid(reason),
            other => other,
        })
    }

    /// Build a block from a network address and prefix length.
    pub fn from_parts(addr: IpAddr, mask: u8) -> Result<AddressBlock, PartitionError> {
        let network = cut_addr(addr, mask)?;
        if network != addr {
            return Err(PartitionError::InvalidCidr {
                input: format!("{addr}/{mask}"),
                reason: format!("Host bits set, network address is {network}/{mask}"),
            });
        }
        Ok(AddressBlock { addr, mask })
    }

    /// Block whose network address is `bits` with the host part cleared.
    pub(crate) fn from_bits(family: AddressFamily, bits: u128, mask: u8) -> AddressBlock {
        let mask = mask.min(family.max_length());
        let network = bits & family.width_mask() & !host_mask(family, mask);
        AddressBlock {
            addr: bits_to_addr(family, network),
            mask,
        }
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(self.addr)
    }

    /// The network address.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn host_bits(&self) -> u32 {
        u32::from(self.family().max_length() - self.mask)
    }

    /// Number of addresses in the block, `None` only for `::/0`.
    pub fn num_addresses(&self) -> Option<u128> {
        1u128.checked_shl(self.host_bits())
    }

    /// Usable host addresses in an OCI subnet of this size (IPv4 only).
    pub fn oci_usable_hosts(&self) -> Option<u128> {
        if self.family() != AddressFamily::V4 {
            return None;
        }
        self.num_addresses()
            .and_then(|n| n.checked_sub(OCI_RESERVED_ADDRESSES))
            .filter(|n| *n > 0)
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> IpAddr {
        self.addr
    }

    /// Get the highest address in the block.
    pub fn hi(&self) -> IpAddr {
        let family = self.family();
        bits_to_addr(
            family,
            addr_to_bits(self.addr) | host_mask(family, self.mask),
        )
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        AddressFamily::of(addr) == self.family() && self.lo() <= addr && addr <= self.hi()
    }

    /// True when `self` lies entirely inside `other`.
    pub fn is_subnet_of(&self, other: &AddressBlock) -> bool {
        self.mask >= other.mask && other.contains(self.addr)
    }

    /// True when the two ranges share at least one address.
    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.is_subnet_of(other) || other.is_subnet_of(self)
    }

    /// The next block of the same size.
    pub fn next_block(&self) -> Result<AddressBlock, PartitionError> {
        let next = ip_after_subnet(self.addr, self.mask)?;
        Ok(AddressBlock {
            addr: next,
            mask: self.mask,
        })
    }
}

impl FromStr for AddressBlock {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressBlock::new(s)
    }
}

impl Serialize for AddressBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D>(deserializer: D) -> Result<AddressBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressBlock::new(&s).map_err(de::Error::custom)
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn test_get_cidr_mask() {
        let f = AddressFamily::V4;
        assert_eq!(get_cidr_mask(f, 0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(f, 8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(f, 16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(f, 32).unwrap(), 0xFFFFFFFF);
        assert!(get_cidr_mask(f, 33).is_err());

        let f = AddressFamily::V6;
        assert_eq!(get_cidr_mask(f, 0).unwrap(), 0);
        assert_eq!(get_cidr_mask(f, 128).unwrap(), u128::MAX);
        assert_eq!(get_cidr_mask(f, 64).unwrap(), u128::MAX << 64);
        assert!(get_cidr_mask(f, 129).is_err());
    }

    #[test]
    fn test_cut_addr() {
        let ip = v4(192, 168, 1, 42);
        assert_eq!(cut_addr(ip, 24).unwrap(), v4(192, 168, 1, 0));
        assert_eq!(cut_addr(ip, 16).unwrap(), v4(192, 168, 0, 0));
        assert_eq!(cut_addr(ip, 0).unwrap(), v4(0, 0, 0, 0));
        assert_eq!(cut_addr(ip, 32).unwrap(), ip);
        assert!(cut_addr(ip, 33).is_err());
    }

    #[test]
    fn test_broadcast_addr() {
        let ip = v4(192, 168, 1, 0);
        assert_eq!(broadcast_addr(ip, 24).unwrap(), v4(192, 168, 1, 255));
        assert_eq!(broadcast_addr(ip, 8).unwrap(), v4(192, 255, 255, 255));
        assert_eq!(broadcast_addr(ip, 32).unwrap(), ip);
        assert_eq!(broadcast_addr(ip, 0).unwrap(), v4(255, 255, 255, 255));
    }

    #[test]
    fn test_ip_after_subnet() {
        let ip = v4(192, 168, 1, 0);
        assert_eq!(ip_after_subnet(ip, 24).unwrap(), v4(192, 168, 2, 0));
        assert_eq!(ip_after_subnet(ip, 16).unwrap(), v4(192, 169, 0, 0));
        assert_eq!(ip_after_subnet(ip, 32).unwrap(), v4(192, 168, 1, 1));
        assert!(ip_after_subnet(v4(255, 255, 255, 0), 24).is_err());
        assert!(ip_after_subnet(v4(0, 0, 0, 0), 0).is_err());
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(AddressBlock::new("10.0.0.0").is_err());
        assert!(AddressBlock::new("10.0.0/16").is_err());
        assert!(AddressBlock::new("10.0.0.0/33").is_err());
        assert!(AddressBlock::new("10.0.0.0/-1").is_err());
        assert!(AddressBlock::new("2001:db8::/129").is_err());
        assert!(AddressBlock::new("").is_err());
        assert!(AddressBlock::new("10.0.0.0/").is_err());
        assert!(AddressBlock::new("10.0.0.0/+16").is_err());
        assert!(AddressBlock::new("10.0.0.0/016").is_err());
        assert!(AddressBlock::new("10.0.0.0/ 16").is_err());
        assert_eq!(AddressBlock::new("0.0.0.0/0").unwrap().mask(), 0);

        let err = AddressBlock::new("10.0.0.5/16").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("10.0.0.0/16"), "{err}");
    }

    #[test]
    fn test_new_trims_and_displays() {
        let block = AddressBlock::new(" 10.0.0.0/16 ").unwrap();
        assert_eq!(block.to_string(), "10.0.0.0/16");
        assert_eq!(block.family(), AddressFamily::V4);
        assert_eq!(block.num_addresses(), Some(65536));
        assert_eq!(block.hi(), v4(10, 0, 255, 255));

        let block: AddressBlock = "2001:db8::/32".parse().unwrap();
        assert_eq!(block.family(), AddressFamily::V6);
        assert_eq!(block.host_bits(), 96);
        assert_eq!(block.to_string(), "2001:db8::/32");

        assert_eq!(AddressBlock::new("::/0").unwrap().num_addresses(), None);
    }

    #[test]
    fn test_overlap_and_containment() {
        let vcn = AddressBlock::new("10.0.0.0/16").unwrap();
        let a = AddressBlock::new("10.0.32.0/19").unwrap();
        let b = AddressBlock::new("10.0.32.0/24").unwrap();
        let c = AddressBlock::new("10.0.64.0/19").unwrap();
        let outside = AddressBlock::new("10.1.0.0/16").unwrap();
        let v6 = AddressBlock::new("::/0").unwrap();

        assert!(a.is_subnet_of(&vcn));
        assert!(!vcn.is_subnet_of(&a));
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!outside.overlaps(&vcn));
        assert!(!v6.overlaps(&vcn));
        assert!(vcn.contains(v4(10, 0, 200, 1)));
        assert!(!vcn.contains(v4(10, 1, 0, 0)));
    }

    #[test]
    fn test_next_block() {
        let block = AddressBlock::new("10.1.1.0/28").unwrap();
        assert_eq!(
            block.next_block().unwrap(),
            AddressBlock::new("10.1.1.16/28").unwrap()
        );
        let block = AddressBlock::new("2001:db8::/64").unwrap();
        assert_eq!(
            block.next_block().unwrap(),
            AddressBlock::new("2001:db8:0:1::/64").unwrap()
        );
        assert!(AddressBlock::new("255.255.255.0/24")
            .unwrap()
            .next_block()
            .is_err());
    }

    #[test]
    fn test_oci_usable_hosts() {
        let host = |s: &str| AddressBlock::new(s).unwrap().oci_usable_hosts();
        assert_eq!(host("10.0.0.0/19"), Some(8189));
        assert_eq!(host("10.0.0.0/24"), Some(253));
        assert_eq!(host("10.0.0.0/30"), Some(1));
        assert_eq!(host("10.0.0.0/31"), None);
        assert_eq!(host("2001:db8::/64"), None);
    }

    #[test]
    fn test_block_cmp() {
        let b1 = AddressBlock::new("10.0.0.0/24").unwrap();
        let b2 = AddressBlock::new("10.0.1.0/24").unwrap();
        let b3 = AddressBlock::new("10.0.0.0/16").unwrap();
        let b6 = AddressBlock::new("::/0").unwrap();

        assert!(b1 < b2);
        assert!(b3 < b1);
        assert!(b2 < b6);
    }

    #[test]
    fn test_serde_as_cidr_string() {
        let block = AddressBlock::new("10.0.160.0/19").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"10.0.160.0/19\"");
        let back: AddressBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(serde_json::from_str::<AddressBlock>("\"10.0.0.1/16\"").is_err());
    }
}
