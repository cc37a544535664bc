//! Network topology declarations.
//!
//! This module builds the declarative plan handed to the provisioning engine:
//! - [`naming`] - Resource names and DNS labels
//! - [`tags`] - Freeform tags and the tag registry
//! - [`vcn`] - The VCN plan itself

mod naming;
mod tags;
mod vcn;

pub use naming::{dns_label, resource_name, MAX_DNS_LABEL_LEN};
pub use tags::{
    TagFactory, TagRegistry, TAG_CIDR_RANGE, TAG_GATEWAY_TYPE, TAG_MANAGED_BY, TAG_NAME,
    TAG_NETWORK_GROUP, TAG_NETWORK_TIER, TAG_NETWORK_TYPE, TAG_RESOURCE_TYPE, TAG_STACK,
};
pub use vcn::{
    DestinationType, GatewayDecl, Gateways, PerTier, RouteRule, RouteTableDecl, SecurityListDecl,
    SubnetDecl, VcnDecl, VcnPlan, ANY_IPV4,
};
