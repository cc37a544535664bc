//! Deterministic CIDR partitioning and VCN topology planning.
//!
//! The core is [`partition`]: split one address block into `count` equal,
//! ascending, non-overlapping children. [`topology::VcnPlan`] uses it to lay
//! out the subnets of a managed Kubernetes VCN.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod topology;

pub use error::PartitionError;
pub use models::AddressBlock;
pub use processing::{partition, partition_cidr, split_at_prefix, PartitionRequest, PartitionResult};

use config::Config;
use std::error::Error;
use topology::VcnPlan;

/// Build the plan for `config`, print it and write the JSON plan file.
///
/// # Returns
/// The plan file name on success.
pub fn run(config: &Config) -> Result<String, Box<dyn Error>> {
    let plan = VcnPlan::build(config)?;
    output::print_plan(&plan)?;
    let plan_file = config.plan_file_name()?;
    output::write_plan(&plan, &plan_file)?;
    Ok(plan_file)
}
