//! VCN topology plan.
//!
//! Turns a [`Config`] into declarations for the VCN, its gateways and one
//! security list, route table and subnet per [`Tier`]. Resources point at
//! each other through [`ResourceRef`]s held in named fields. Nothing is
//! declared unless the VCN block partitions cleanly.

use crate::config::Config;
use crate::models::{
    AddressBlock, AddressFamily, FreeformTags, ResourceKind, ResourceRef, SubnetRole, Tier,
};
use crate::processing::{verify_allocation, PartitionRequest};
use serde::Serialize;
use std::error::Error;

use super::naming::{dns_label, resource_name};
use super::tags::{TagFactory, TagRegistry, TAG_CIDR_RANGE, TAG_NETWORK_TIER};

/// Destination of every default route.
pub const ANY_IPV4: &str = "0.0.0.0/0";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VcnDecl {
    pub name: String,
    pub compartment_id: String,
    pub cidr_blocks: Vec<AddressBlock>,
    pub dns_label: String,
    pub freeform_tags: FreeformTags,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GatewayDecl {
    pub resource: ResourceRef,
    pub vcn: ResourceRef,
    pub enabled: bool,
    /// Services reachable through a service gateway, empty otherwise.
    pub services: Vec<String>,
    pub freeform_tags: FreeformTags,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Gateways {
    pub internet: GatewayDecl,
    pub nat: GatewayDecl,
    pub service: GatewayDecl,
}

/// Security lists are declared without rules.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SecurityListDecl {
    pub resource: ResourceRef,
    pub vcn: ResourceRef,
    pub freeform_tags: FreeformTags,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationType {
    CidrBlock,
    ServiceCidrBlock,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RouteRule {
    pub destination: String,
    pub destination_type: DestinationType,
    pub network_entity: ResourceRef,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RouteTableDecl {
    pub resource: ResourceRef,
    pub vcn: ResourceRef,
    pub route_rules: Vec<RouteRule>,
    pub freeform_tags: FreeformTags,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubnetDecl {
    pub resource: ResourceRef,
    pub tier: Tier,
    pub role: SubnetRole,
    pub vcn: ResourceRef,
    pub cidr_block: AddressBlock,
    pub dns_label: String,
    pub prohibit_public_ip_on_vnic: bool,
    pub security_list: ResourceRef,
    pub route_table: ResourceRef,
    pub freeform_tags: FreeformTags,
}

/// One value per [`Tier`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PerTier<T> {
    pub public_a: T,
    pub public_b: T,
    pub private_a: T,
    pub private_b: T,
}

impl<T> PerTier<T> {
    /// Build each tier's value in [`Tier::ALL`] order.
    pub fn from_fn<F>(mut f: F) -> PerTier<T>
    where
        F: FnMut(Tier) -> T,
    {
        PerTier {
            public_a: f(Tier::PublicA),
            public_b: f(Tier::PublicB),
            private_a: f(Tier::PrivateA),
            private_b: f(Tier::PrivateB),
        }
    }

    /// Build each tier's value in [`Tier::ALL`] order, stopping at the first error.
    pub fn try_from_fn<E, F>(mut f: F) -> Result<PerTier<T>, E>
    where
        F: FnMut(Tier) -> Result<T, E>,
    {
        Ok(PerTier {
            public_a: f(Tier::PublicA)?,
            public_b: f(Tier::PublicB)?,
            private_a: f(Tier::PrivateA)?,
            private_b: f(Tier::PrivateB)?,
        })
    }

    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::PublicA => &self.public_a,
            Tier::PublicB => &self.public_b,
            Tier::PrivateA => &self.private_a,
            Tier::PrivateB => &self.private_b,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> + '_ {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }
}

/// Everything to hand to the provisioning engine for one VCN.
#[derive(Serialize, Debug, Clone)]
pub struct VcnPlan {
    pub vcn_cidr: AddressBlock,
    /// All partition blocks in index order, named roles first.
    pub subnet_cidrs: Vec<AddressBlock>,
    /// Requested blocks with no named role.
    pub reserved_cidrs: Vec<AddressBlock>,
    pub vcn: VcnDecl,
    pub gateways: Gateways,
    pub security_lists: PerTier<SecurityListDecl>,
    pub route_tables: PerTier<RouteTableDecl>,
    pub subnets: PerTier<SubnetDecl>,
    #[serde(skip)]
    pub tags: TagRegistry,
}

struct PlanBuilder<'a> {
    config: &'a Config,
    factory: TagFactory<'a>,
    tags: TagRegistry,
}

impl<'a> PlanBuilder<'a> {
    fn name(&self, suffix: &str) -> String {
        resource_name(&self.config.stack_name, &self.config.name, suffix)
    }

    /// Create a handle for a new resource and index its tags.
    fn declare(&mut self, kind: ResourceKind, name: &str, tags: &FreeformTags) -> ResourceRef {
        let resource = ResourceRef::new(kind, name);
        self.tags.register(&resource, tags);
        log::debug!("declare {resource}");
        resource
    }

    fn vcn(&mut self, vcn_cidr: AddressBlock) -> Result<(VcnDecl, ResourceRef), Box<dyn Error>> {
        let name = self.name("vcn");
        let tags = self
            .factory
            .freeform_tags(&name, ResourceKind::Vcn, &[(TAG_NETWORK_TIER, "core")]);
        let resource = self.declare(ResourceKind::Vcn, &name, &tags);
        let decl = VcnDecl {
            name,
            compartment_id: self.config.compartment_id.clone(),
            cidr_blocks: vec![vcn_cidr],
            dns_label: dns_label(&self.config.name, "vcn")?,
            freeform_tags: tags,
        };
        Ok((decl, resource))
    }

    fn gateway(
        &mut self,
        vcn: &ResourceRef,
        kind: ResourceKind,
        suffix: &str,
        gateway_type: &str,
        services: Vec<String>,
    ) -> GatewayDecl {
        let name = self.name(suffix);
        let tags = self.factory.gateway_tags(&name, kind, gateway_type);
        GatewayDecl {
            resource: self.declare(kind, &name, &tags),
            vcn: vcn.clone(),
            enabled: true,
            services,
            freeform_tags: tags,
        }
    }

    fn gateways(&mut self, vcn: &ResourceRef) -> Gateways {
        let services = vec![self.config.service_cidr_label.clone()];
        Gateways {
            internet: self.gateway(vcn, ResourceKind::InternetGateway, "igw", "internet", vec![]),
            nat: self.gateway(vcn, ResourceKind::NatGateway, "natgw", "nat", vec![]),
            service: self.gateway(
                vcn,
                ResourceKind::ServiceGateway,
                "svcgw",
                "service",
                services,
            ),
        }
    }

    fn security_list(&mut self, vcn: &ResourceRef, tier: Tier) -> SecurityListDecl {
        let name = self.name(&format!("sl-{}", tier.short_name()));
        let tags = self
            .factory
            .network_resource_tags(&name, ResourceKind::SecurityList, tier, &[]);
        SecurityListDecl {
            resource: self.declare(ResourceKind::SecurityList, &name, &tags),
            vcn: vcn.clone(),
            freeform_tags: tags,
        }
    }

    fn route_rules(&self, tier: Tier, gateways: &Gateways) -> Vec<RouteRule> {
        if tier.is_public() {
            vec![RouteRule {
                destination: ANY_IPV4.to_string(),
                destination_type: DestinationType::CidrBlock,
                network_entity: gateways.internet.resource.clone(),
            }]
        } else {
            vec![
                RouteRule {
                    destination: ANY_IPV4.to_string(),
                    destination_type: DestinationType::CidrBlock,
                    network_entity: gateways.nat.resource.clone(),
                },
                RouteRule {
                    destination: self.config.service_cidr_label.clone(),
                    destination_type: DestinationType::ServiceCidrBlock,
                    network_entity: gateways.service.resource.clone(),
                },
            ]
        }
    }

    fn route_table(
        &mut self,
        vcn: &ResourceRef,
        tier: Tier,
        gateways: &Gateways,
    ) -> RouteTableDecl {
        let name = self.name(&format!("rt-{}", tier.short_name()));
        let tags = self
            .factory
            .network_resource_tags(&name, ResourceKind::RouteTable, tier, &[]);
        RouteTableDecl {
            resource: self.declare(ResourceKind::RouteTable, &name, &tags),
            vcn: vcn.clone(),
            route_rules: self.route_rules(tier, gateways),
            freeform_tags: tags,
        }
    }

    fn subnet(
        &mut self,
        vcn: &ResourceRef,
        tier: Tier,
        cidr_block: AddressBlock,
        security_list: &SecurityListDecl,
        route_table: &RouteTableDecl,
    ) -> Result<SubnetDecl, Box<dyn Error>> {
        let name = self.name(&format!("sn-{}", tier.short_name()));
        let cidr = cidr_block.to_string();
        let tags = self.factory.network_resource_tags(
            &name,
            ResourceKind::Subnet,
            tier,
            &[(TAG_CIDR_RANGE, cidr.as_str())],
        );
        log::info!("subnet {name} [{tier}/{role}] => {cidr}", role = tier.role());
        Ok(SubnetDecl {
            resource: self.declare(ResourceKind::Subnet, &name, &tags),
            tier,
            role: tier.role(),
            vcn: vcn.clone(),
            cidr_block,
            dns_label: dns_label(&self.config.name, tier.dns_suffix())?,
            prohibit_public_ip_on_vnic: !tier.is_public(),
            security_list: security_list.resource.clone(),
            route_table: route_table.resource.clone(),
            freeform_tags: tags,
        })
    }
}

impl VcnPlan {
    /// Partition the VCN block and declare the whole topology.
    ///
    /// # Returns
    /// * `Ok(VcnPlan)` - Every resource declaration
    /// * `Err` - Bad CIDR, capacity exceeded or bad naming input; no partial plan
    pub fn build(config: &Config) -> Result<VcnPlan, Box<dyn Error>> {
        log::info!(
            "#Start VcnPlan::build() stack={} name={} cidr={} subnets={}",
            config.stack_name,
            config.name,
            config.vcn_cidr_block,
            config.subnet_count
        );

        let vcn_cidr = AddressBlock::new(&config.vcn_cidr_block).map_err(|e| {
            log::error!("VCN block rejected: {e}");
            e
        })?;
        if vcn_cidr.family() != AddressFamily::V4 {
            log::error!("VCN block {vcn_cidr} is not IPv4");
            return Err(format!("VCN block {vcn_cidr} must be an IPv4 block").into());
        }
        let partition = PartitionRequest::new(vcn_cidr, config.subnet_count)
            .with_max_prefix_len(config.max_subnet_prefix_len)
            .partition()
            .map_err(|e| {
                log::error!("Cannot partition VCN block: {e}");
                e
            })?;
        verify_allocation(vcn_cidr, &partition.blocks)?;

        let subnet_cidrs = partition.blocks.clone();
        if subnet_cidrs.len() < SubnetRole::ALL.len() {
            return Err(format!(
                "{} subnet blocks cannot cover {} roles",
                subnet_cidrs.len(),
                SubnetRole::ALL.len()
            )
            .into());
        }
        let reserved_cidrs = subnet_cidrs[SubnetRole::ALL.len()..].to_vec();
        for block in &reserved_cidrs {
            log::info!("reserved block {block} (no role assigned)");
        }
        for block in partition.reserved() {
            log::debug!("unallocated block {block}");
        }

        let mut builder = PlanBuilder {
            config,
            factory: TagFactory::new(&config.stack_name, &config.managed_by),
            tags: TagRegistry::new(),
        };

        let (vcn, vcn_ref) = builder.vcn(vcn_cidr)?;
        let gateways = builder.gateways(&vcn_ref);
        let security_lists = PerTier::from_fn(|tier| builder.security_list(&vcn_ref, tier));
        let route_tables = PerTier::from_fn(|tier| builder.route_table(&vcn_ref, tier, &gateways));
        let subnets = PerTier::try_from_fn(|tier| {
            builder.subnet(
                &vcn_ref,
                tier,
                subnet_cidrs[tier.role().index()],
                security_lists.get(tier),
                route_tables.get(tier),
            )
        })?;

        log::info!(
            "#End VcnPlan::build() {} tag pairs indexed",
            builder.tags.len()
        );

        Ok(VcnPlan {
            vcn_cidr,
            subnet_cidrs,
            reserved_cidrs,
            vcn,
            gateways,
            security_lists,
            route_tables,
            subnets,
            tags: builder.tags,
        })
    }

    /// The subnet serving `role`.
    pub fn subnet_for_role(&self, role: SubnetRole) -> &SubnetDecl {
        self.subnets.get(Tier::for_role(role))
    }

    /// Resources carrying the tag `key=value`.
    pub fn resources_by_tag(&self, key: &str, value: &str) -> &[ResourceRef] {
        self.tags.resources_by_tag(key, value)
    }

    pub fn to_json(&self) -> Result<String, Box<dyn Error>> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Error serializing plan: {e}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tags::{TAG_GATEWAY_TYPE, TAG_NETWORK_GROUP, TAG_NETWORK_TYPE};

    fn test_config() -> Config {
        Config {
            compartment_id: "ocid1.compartment.oc1..test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_assigns_roles_by_index() {
        let plan = VcnPlan::build(&test_config()).expect("plan should build");
        let cidr = |role| plan.subnet_for_role(role).cidr_block.to_string();
        assert_eq!(cidr(SubnetRole::LoadBalancer), "10.0.0.0/19");
        assert_eq!(cidr(SubnetRole::Public), "10.0.32.0/19");
        assert_eq!(cidr(SubnetRole::Pods), "10.0.64.0/19");
        assert_eq!(cidr(SubnetRole::Workers), "10.0.96.0/19");

        assert_eq!(plan.subnets.public_b.role, SubnetRole::LoadBalancer);
        assert_eq!(plan.subnets.private_a.role, SubnetRole::Workers);
        assert_eq!(plan.subnet_cidrs.len(), 6);
        assert_eq!(
            plan.reserved_cidrs,
            vec![
                AddressBlock::new("10.0.128.0/19").unwrap(),
                AddressBlock::new("10.0.160.0/19").unwrap(),
            ]
        );
    }

    #[test]
    fn test_subnet_wiring() {
        let plan = VcnPlan::build(&test_config()).unwrap();
        for (tier, subnet) in plan.subnets.iter() {
            assert_eq!(subnet.tier, tier);
            assert_eq!(subnet.security_list, plan.security_lists.get(tier).resource);
            assert_eq!(subnet.route_table, plan.route_tables.get(tier).resource);
            assert_eq!(subnet.prohibit_public_ip_on_vnic, !tier.is_public());
            assert_eq!(subnet.vcn.name, "dev-okeinfra-vcn");
        }
        assert_eq!(plan.subnets.private_b.resource.name, "dev-okeinfra-sn-prv-b");
        assert_eq!(plan.subnets.private_b.dns_label, "okeinfraprvb");
        assert_eq!(
            plan.subnets.public_a.freeform_tags[TAG_CIDR_RANGE],
            "10.0.32.0/19"
        );
    }

    #[test]
    fn test_route_rules() {
        let plan = VcnPlan::build(&test_config()).unwrap();
        let public = &plan.route_tables.public_a.route_rules;
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].network_entity, plan.gateways.internet.resource);

        let private = &plan.route_tables.private_b.route_rules;
        assert_eq!(private.len(), 2);
        assert_eq!(private[0].destination, ANY_IPV4);
        assert_eq!(private[0].network_entity, plan.gateways.nat.resource);
        assert_eq!(private[1].destination_type, DestinationType::ServiceCidrBlock);
        assert_eq!(private[1].network_entity, plan.gateways.service.resource);
    }

    #[test]
    fn test_resources_by_tag() {
        let plan = VcnPlan::build(&test_config()).unwrap();
        let private = plan.resources_by_tag(TAG_NETWORK_TYPE, "private");
        // security list, route table and subnet for each private tier
        assert_eq!(private.len(), 6);
        assert!(private.iter().all(|r| r.name.contains("prv-")));

        let group = plan.resources_by_tag(TAG_NETWORK_GROUP, "public-b");
        let kinds: Vec<ResourceKind> = group.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ResourceKind::SecurityList, ResourceKind::RouteTable, ResourceKind::Subnet]
        );

        let service = plan.resources_by_tag(TAG_GATEWAY_TYPE, "service");
        assert_eq!(service, &[plan.gateways.service.resource.clone()]);
    }

    #[test]
    fn test_build_aborts_on_capacity() {
        let config = Config {
            vcn_cidr_block: "10.0.0.0/28".to_string(),
            ..test_config()
        };
        let err = VcnPlan::build(&config).unwrap_err();
        assert!(err.to_string().contains("Capacity exceeded"), "{err}");

        let config = Config {
            vcn_cidr_block: "10.0.0.0/27".to_string(),
            ..test_config()
        };
        let plan = VcnPlan::build(&config).expect("/27 splits into eight /30");
        assert_eq!(plan.subnets.public_a.cidr_block.to_string(), "10.0.0.4/30");
    }

    #[test]
    fn test_build_rejects_malformed_cidr() {
        let config = Config {
            vcn_cidr_block: "10.0.0.0/16/2".to_string(),
            ..test_config()
        };
        let err = VcnPlan::build(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid CIDR block"), "{err}");
    }

    #[test]
    fn test_build_rejects_ipv6_vcn() {
        let config = Config {
            vcn_cidr_block: "2001:db8::/56".to_string(),
            ..test_config()
        };
        let err = VcnPlan::build(&config).unwrap_err();
        assert!(err.to_string().contains("must be an IPv4 block"), "{err}");
    }

    #[test]
    fn test_per_tier_from_fn() {
        let names = PerTier::from_fn(|tier| tier.short_name());
        assert_eq!(names.public_a, "pub-a");
        assert_eq!(names.private_b, "prv-b");
        let order: Vec<Tier> = names.iter().map(|(tier, _)| tier).collect();
        assert_eq!(order, Tier::ALL.to_vec());
    }

    #[test]
    fn test_plan_json() {
        let plan = VcnPlan::build(&test_config()).unwrap();
        let json = plan.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vcn_cidr"], "10.0.0.0/16");
        assert_eq!(value["subnets"]["private_a"]["cidr_block"], "10.0.96.0/19");
        assert_eq!(value["subnets"]["private_a"]["role"], "workers");
        assert_eq!(
            value["route_tables"]["private_a"]["route_rules"][1]["destination_type"],
            "SERVICE_CIDR_BLOCK"
        );
        assert!(value.get("tags").is_none());
        assert_eq!(json, VcnPlan::build(&test_config()).unwrap().to_json().unwrap());
    }
}
