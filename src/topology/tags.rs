//! Freeform tags and the tag registry.
//!
//! Tags are built here for every declared resource. The [`TagRegistry`] is
//! filled as resources are declared, so lookups by tag never need to scan
//! the plan.

use crate::models::{FreeformTags, ResourceKind, ResourceRef, Tier};
use std::collections::BTreeMap;

pub const TAG_NAME: &str = "Name";
pub const TAG_RESOURCE_TYPE: &str = "ResourceType";
pub const TAG_STACK: &str = "Stack";
pub const TAG_MANAGED_BY: &str = "ManagedBy";
pub const TAG_GATEWAY_TYPE: &str = "GatewayType";
pub const TAG_NETWORK_TYPE: &str = "NetworkType";
pub const TAG_NETWORK_GROUP: &str = "NetworkGroup";
pub const TAG_NETWORK_TIER: &str = "NetworkTier";
pub const TAG_CIDR_RANGE: &str = "CidrRange";

/// Builds the tag sets shared by every resource of one stack.
#[derive(Debug, Clone)]
pub struct TagFactory<'a> {
    pub stack_name: &'a str,
    pub managed_by: &'a str,
}

impl<'a> TagFactory<'a> {
    pub fn new(stack_name: &'a str, managed_by: &'a str) -> TagFactory<'a> {
        TagFactory {
            stack_name,
            managed_by,
        }
    }

    /// Base tags plus `extra`. Extra keys win over base keys.
    pub fn freeform_tags(
        &self,
        name: &str,
        kind: ResourceKind,
        extra: &[(&str, &str)],
    ) -> FreeformTags {
        let mut tags = FreeformTags::new();
        tags.insert(TAG_NAME.to_string(), name.to_string());
        tags.insert(TAG_RESOURCE_TYPE.to_string(), kind.as_str().to_string());
        tags.insert(TAG_STACK.to_string(), self.stack_name.to_string());
        tags.insert(TAG_MANAGED_BY.to_string(), self.managed_by.to_string());
        for (key, value) in extra {
            tags.insert(key.to_string(), value.to_string());
        }
        tags
    }

    /// Tags for a gateway; `gateway_type` is "internet", "nat" or "service".
    pub fn gateway_tags(&self, name: &str, kind: ResourceKind, gateway_type: &str) -> FreeformTags {
        self.freeform_tags(name, kind, &[(TAG_GATEWAY_TYPE, gateway_type)])
    }

    /// Tags for a resource owned by a tier (security list, route table, subnet).
    pub fn network_resource_tags(
        &self,
        name: &str,
        kind: ResourceKind,
        tier: Tier,
        extra: &[(&str, &str)],
    ) -> FreeformTags {
        let mut tags = self.freeform_tags(
            name,
            kind,
            &[
                (TAG_NETWORK_TYPE, tier.network_type().as_str()),
                (TAG_NETWORK_GROUP, tier.full_name()),
            ],
        );
        for (key, value) in extra {
            tags.insert(key.to_string(), value.to_string());
        }
        tags
    }
}

/// Index from `(tag key, tag value)` to the resources carrying that tag.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    index: BTreeMap<(String, String), Vec<ResourceRef>>,
}

impl TagRegistry {
    pub fn new() -> TagRegistry {
        TagRegistry::default()
    }

    /// Record every tag of `resource`.
    pub fn register(&mut self, resource: &ResourceRef, tags: &FreeformTags) {
        for (key, value) in tags {
            self.index
                .entry((key.clone(), value.clone()))
                .or_default()
                .push(resource.clone());
        }
    }

    /// Resources carrying `key=value`, in declaration order.
    pub fn resources_by_tag(&self, key: &str, value: &str) -> &[ResourceRef] {
        self.index
            .get(&(key.to_string(), value.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct `(key, value)` pairs seen.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
