//! Plan summary on stdout and the JSON plan file.

use crate::models::SubnetRole;
use crate::topology::VcnPlan;
use colored::Colorize;
use std::error::Error;

use super::terminal::format_field;

/// One line of the subnet summary, for a role's block or a reserved block.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    /// Partition index of the block.
    pub index: usize,
    /// Role name, or "-reserved-".
    pub role: String,
    pub tier: String,
    pub cidr: String,
    /// Last address of the block.
    pub last_addr: String,
    pub usable_hosts: String,
    pub subnet_name: String,
    pub dns_label: String,
    pub route_table: String,
    pub security_list: String,
}

/// Rows for every partition block in index order.
pub fn plan_rows(plan: &VcnPlan) -> Vec<PlanRow> {
    plan.subnet_cidrs
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let usable_hosts = block
                .oci_usable_hosts()
                .map_or_else(|| "n/a".to_string(), |n| n.to_string());
            match SubnetRole::ALL.get(index) {
                Some(role) => {
                    let subnet = plan.subnet_for_role(*role);
                    PlanRow {
                        index,
                        role: role.to_string(),
                        tier: subnet.tier.to_string(),
                        cidr: block.to_string(),
                        last_addr: block.hi().to_string(),
                        usable_hosts,
                        subnet_name: subnet.resource.name.clone(),
                        dns_label: subnet.dns_label.clone(),
                        route_table: subnet.route_table.name.clone(),
                        security_list: subnet.security_list.name.clone(),
                    }
                }
                None => PlanRow {
                    index,
                    role: "-reserved-".to_string(),
                    tier: "None".to_string(),
                    cidr: block.to_string(),
                    last_addr: block.hi().to_string(),
                    usable_hosts,
                    subnet_name: "None".to_string(),
                    dns_label: "None".to_string(),
                    route_table: "None".to_string(),
                    security_list: "None".to_string(),
                },
            }
        })
        .collect()
}

/// Print the subnet summary as quoted columns.
pub fn print_plan(plan: &VcnPlan) -> Result<(), Box<dyn Error>> {
    log::info!(
        "#Start print_plan() vcn={} blocks={}",
        plan.vcn_cidr,
        plan.subnet_cidrs.len()
    );

    println!(
        "VCN: '{name}' {cidr} compartment='{compartment}'",
        name = plan.vcn.name.bold(),
        cidr = plan.vcn_cidr.to_string().green(),
        compartment = plan.vcn.compartment_id
    );
    println!(
        r#" "idx",          "role",      "tier",       "cidr",        "last_addr",  "hosts",              "subnet_name", "dns_label",            "route_table",          "security_list""#
    );
    for row in plan_rows(plan) {
        print_row(&row);
    }

    if !plan.reserved_cidrs.is_empty() {
        println!(
            "#{}# {} block(s) requested without a role, kept for future tiers",
            "NOTE".on_red(),
            plan.reserved_cidrs.len()
        );
    }
    Ok(())
}

fn print_row(row: &PlanRow) {
    let line = format!(
        "{index},{role},{tier},{cidr},{last_addr},{hosts},{subnet_name},{dns_label},{route_table},{security_list}",
        index = format_field(row.index, 6),
        role = format_field(&row.role, 15),
        tier = format_field(&row.tier, 11),
        cidr = format_field(&row.cidr, 15),
        last_addr = format_field(&row.last_addr, 15),
        hosts = format_field(&row.usable_hosts, 8),
        subnet_name = format_field(&row.subnet_name, 26),
        dns_label = format_field(&row.dns_label, 12),
        route_table = format_field(&row.route_table, 24),
        security_list = format_field(&row.security_list, 24),
    );
    if row.subnet_name == "None" {
        println!("{}", line.dimmed());
    } else {
        println!("{line}");
    }
}

/// Write the plan as pretty JSON to `path`.
pub fn write_plan(plan: &VcnPlan, path: &str) -> Result<(), Box<dyn Error>> {
    let json = plan.to_json()?;
    log::warn!("Writing plan to file: {path}");
    std::fs::write(path, json).map_err(|e| format!("Error writing plan file {path}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_plan() -> VcnPlan {
        let config = Config {
            compartment_id: "ocid1.compartment.oc1..test".to_string(),
            ..Default::default()
        };
        VcnPlan::build(&config).expect("plan should build")
    }

    #[test]
    fn test_plan_rows() {
        let rows = plan_rows(&test_plan());
        assert_eq!(rows.len(), 6);

        assert_eq!(rows[0].role, "load-balancer");
        assert_eq!(rows[0].tier, "public-b");
        assert_eq!(rows[0].cidr, "10.0.0.0/19");
        assert_eq!(rows[0].last_addr, "10.0.31.255");
        assert_eq!(rows[0].usable_hosts, "8189");
        assert_eq!(rows[0].subnet_name, "dev-okeinfra-sn-pub-b");

        assert_eq!(rows[3].role, "workers");
        assert_eq!(rows[3].route_table, "dev-okeinfra-rt-prv-a");

        assert_eq!(rows[5].role, "-reserved-");
        assert_eq!(rows[5].cidr, "10.0.160.0/19");
        assert_eq!(rows[5].subnet_name, "None");
    }

    #[test]
    fn test_write_plan() {
        let plan = test_plan();
        let path = std::env::temp_dir().join("vcn_plan_write_test.json");
        let path = path.to_str().expect("temp path should be utf-8");
        write_plan(&plan, path).expect("Error writing plan");

        let json = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vcn"]["dns_label"], "okeinfravcn");
        std::fs::remove_file(path).ok();
    }
}
