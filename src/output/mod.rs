//! Output of a built plan.
//!
//! - [`plan`] - Subnet table on stdout and the JSON plan file
//! - [`terminal`] - Field formatting helpers

mod plan;
mod terminal;

pub use plan::{plan_rows, print_plan, write_plan, PlanRow};
pub use terminal::format_field;
