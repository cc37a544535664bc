//! Declared network resource handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Freeform tags attached to a declared resource, ordered by key.
pub type FreeformTags = BTreeMap<String, String>;

/// Kind of network resource handed to the provisioning engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Vcn,
    InternetGateway,
    NatGateway,
    ServiceGateway,
    SecurityList,
    RouteTable,
    Subnet,
}

impl ResourceKind {
    /// Value of the `ResourceType` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vcn => "vcn",
            ResourceKind::InternetGateway => "internet-gateway",
            ResourceKind::NatGateway => "nat-gateway",
            ResourceKind::ServiceGateway => "service-gateway",
            ResourceKind::SecurityList => "security-list",
            ResourceKind::RouteTable => "route-table",
            ResourceKind::Subnet => "subnet",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a declared resource, used where one resource points at another.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, name: &str) -> ResourceRef {
        ResourceRef {
            kind,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_serde() {
        let json = serde_json::to_string(&ResourceKind::InternetGateway).unwrap();
        assert_eq!(json, "\"internet-gateway\"");
        assert_eq!(ResourceKind::SecurityList.to_string(), "security-list");
    }

    #[test]
    fn test_resource_ref_display() {
        let r = ResourceRef::new(ResourceKind::Subnet, "dev-okeinfra-sn-pub-a");
        assert_eq!(r.to_string(), "subnet:dev-okeinfra-sn-pub-a");
    }
}
