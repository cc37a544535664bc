//! Domain models for VCN subnet planning.
//!
//! This module contains the core data structures used throughout the application:
//! - [`AddressBlock`] - IPv4/IPv6 block in CIDR notation
//! - [`ResourceRef`], [`FreeformTags`] - handles and tags of declared resources
//! - [`SubnetRole`] and [`Tier`] - what each partitioned block is used for

mod cidr;
mod resource;
mod role;

// Re-export public types
pub use cidr::{
    addr_to_bits, bits_to_addr, broadcast_addr, cut_addr, get_cidr_mask, ip_after_subnet,
    AddressBlock, AddressFamily, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use resource::{FreeformTags, ResourceKind, ResourceRef};
pub use role::{NetworkType, SubnetRole, Tier};
