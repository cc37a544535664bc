//! Subnet roles and network tiers.
//!
//! A [`SubnetRole`] is bound to a fixed index of the VCN partition. A
//! [`Tier`] is the public/private, A/B grouping that owns one subnet, one
//! security list and one route table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload role of a partitioned block.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum SubnetRole {
    LoadBalancer,
    Public,
    Pods,
    Workers,
}

impl SubnetRole {
    /// Roles in partition index order. New roles go at the end.
    pub const ALL: [SubnetRole; 4] = [
        SubnetRole::LoadBalancer,
        SubnetRole::Public,
        SubnetRole::Pods,
        SubnetRole::Workers,
    ];

    /// Position of this role's block in the partition output.
    pub fn index(self) -> usize {
        match self {
            SubnetRole::LoadBalancer => 0,
            SubnetRole::Public => 1,
            SubnetRole::Pods => 2,
            SubnetRole::Workers => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubnetRole::LoadBalancer => "load-balancer",
            SubnetRole::Public => "public",
            SubnetRole::Pods => "pods",
            SubnetRole::Workers => "workers",
        }
    }
}

impl fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a tier is reachable from the internet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    Public,
    Private,
}

impl NetworkType {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Public => "public",
            NetworkType::Private => "private",
        }
    }
}

/// Network tier owning a subnet, its security list and its route table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    PublicA,
    PublicB,
    PrivateA,
    PrivateB,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::PublicA, Tier::PublicB, Tier::PrivateA, Tier::PrivateB];

    /// Short form used inside resource names, e.g. `sn-pub-a`.
    pub fn short_name(self) -> &'static str {
        match self {
            Tier::PublicA => "pub-a",
            Tier::PublicB => "pub-b",
            Tier::PrivateA => "prv-a",
            Tier::PrivateB => "prv-b",
        }
    }

    /// Value of the `NetworkGroup` tag.
    pub fn full_name(self) -> &'static str {
        match self {
            Tier::PublicA => "public-a",
            Tier::PublicB => "public-b",
            Tier::PrivateA => "private-a",
            Tier::PrivateB => "private-b",
        }
    }

    pub fn network_type(self) -> NetworkType {
        match self {
            Tier::PublicA | Tier::PublicB => NetworkType::Public,
            Tier::PrivateA | Tier::PrivateB => NetworkType::Private,
        }
    }

    pub fn is_public(self) -> bool {
        self.network_type() == NetworkType::Public
    }

    /// The role whose block this tier's subnet uses.
    pub fn role(self) -> SubnetRole {
        match self {
            Tier::PublicA => SubnetRole::Public,
            Tier::PublicB => SubnetRole::LoadBalancer,
            Tier::PrivateA => SubnetRole::Workers,
            Tier::PrivateB => SubnetRole::Pods,
        }
    }

    /// The tier whose subnet serves `role`.
    pub fn for_role(role: SubnetRole) -> Tier {
        match role {
            SubnetRole::Public => Tier::PublicA,
            SubnetRole::LoadBalancer => Tier::PublicB,
            SubnetRole::Workers => Tier::PrivateA,
            SubnetRole::Pods => Tier::PrivateB,
        }
    }

    /// DNS label suffix of the tier's subnet.
    pub fn dns_suffix(self) -> &'static str {
        match self {
            Tier::PublicA => "puba",
            Tier::PublicB => "pubb",
            Tier::PrivateA => "prva",
            Tier::PrivateB => "prvb",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}
