//! Deployment configuration.
//!
//! Settings are read from a JSON file (default [`DEFAULT_CONFIG_FILE`],
//! override with `VCN_CONFIG`) and then overridden from the environment.
//! `main` loads `.env` with dotenv before calling [`Config::load`].

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io::ErrorKind;
use std::path::Path;

use crate::models::{AddressBlock, AddressFamily, SubnetRole};

pub const DEFAULT_CONFIG_FILE: &str = "vcn.json";
pub const DEFAULT_VCN_CIDR: &str = "10.0.0.0/16";

/// Blocks requested from the VCN block. Indices past the named roles are reserved.
pub const SUBNET_COUNT: usize = 6;

/// OCI does not accept subnets smaller than a /30.
pub const OCI_MAX_SUBNET_PREFIX_LEN: u8 = 30;

pub const ENV_CONFIG_FILE: &str = "VCN_CONFIG";
pub const ENV_VCN_CIDR: &str = "VCN_CIDR_BLOCK";
pub const ENV_STACK_NAME: &str = "VCN_STACK_NAME";
pub const ENV_COMPARTMENT_ID: &str = "VCN_COMPARTMENT_ID";

/// Settings for one VCN deployment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logical name of the network block, e.g. "okeinfra".
    pub name: String,
    /// Stack (environment) the resources belong to.
    pub stack_name: String,
    /// OCID of the compartment receiving the resources.
    pub compartment_id: String,
    /// Address block of the whole VCN.
    pub vcn_cidr_block: String,
    pub subnet_count: usize,
    /// Longest prefix a subnet may have.
    pub max_subnet_prefix_len: u8,
    /// Destination of the private route to the service gateway.
    pub service_cidr_label: String,
    /// Value of the `ManagedBy` tag.
    pub managed_by: String,
    /// Timezone used to date the plan file name.
    pub timezone: String,
    /// Where to write the JSON plan. Defaults to a dated file name.
    pub output_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "okeinfra".to_string(),
            stack_name: "dev".to_string(),
            compartment_id: "".to_string(),
            vcn_cidr_block: DEFAULT_VCN_CIDR.to_string(),
            subnet_count: SUBNET_COUNT,
            max_subnet_prefix_len: OCI_MAX_SUBNET_PREFIX_LEN,
            service_cidr_label: "all-services-in-oracle-services-network".to_string(),
            managed_by: "vcn-subnet-planner".to_string(),
            timezone: "UTC".to_string(),
            output_file: None,
        }
    }
}

impl Config {
    /// Parse a JSON config, reporting the path of the field that failed.
    pub fn from_json(json: &str) -> Result<Config, Box<dyn Error>> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let config: Config = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| format!("Error parsing config: path={} error={}", e.path(), e))?;
        Ok(config)
    }

    /// Read config from a file.
    ///
    /// # Arguments
    /// * `config_file` - Optional path. If given it must exist; if None,
    ///   [`DEFAULT_CONFIG_FILE`] is used when present, defaults otherwise.
    pub fn read_config(config_file: Option<&str>) -> Result<Config, Box<dyn Error>> {
        let (config_file, explicit) = match config_file {
            Some(file) => {
                if !Path::new(file).exists() {
                    return Err(format!("Config file does not exist: {file}").into());
                }
                log::info!("Using provided config file: {file}");
                (file, true)
            }
            None => (DEFAULT_CONFIG_FILE, false),
        };

        match std::fs::read_to_string(config_file) {
            Ok(json) => {
                log::info!("Reading config file: {config_file}");
                Config::from_json(&json)
            }
            Err(e) if !explicit && e.kind() == ErrorKind::NotFound => {
                log::warn!("Config file not found: {config_file}, using defaults");
                Ok(Config::default())
            }
            Err(e) => {
                log::error!("Error reading config file {config_file}: {e}");
                Err(format!("Error reading config file {config_file}: {e}").into())
            }
        }
    }

    /// Read the config file named by `VCN_CONFIG`, apply env overrides and validate.
    pub fn load() -> Result<Config, Box<dyn Error>> {
        let config_file = std::env::var(ENV_CONFIG_FILE).ok();
        let mut config = Config::read_config(config_file.as_deref())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (ENV_VCN_CIDR, &mut self.vcn_cidr_block),
            (ENV_STACK_NAME, &mut self.stack_name),
            (ENV_COMPARTMENT_ID, &mut self.compartment_id),
        ];
        for (key, field) in targets {
            if let Some(value) = lookup(key) {
                log::debug!("{key} overrides config value '{field}' with '{value}'");
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.name.trim().is_empty() {
            return Err("Config 'name' must not be empty".into());
        }
        if self.stack_name.trim().is_empty() {
            return Err("Config 'stack_name' must not be empty".into());
        }
        if self.compartment_id.trim().is_empty() {
            return Err(format!(
                "Config 'compartment_id' is required (set it in the config file or {ENV_COMPARTMENT_ID})"
            )
            .into());
        }
        let vcn_cidr = AddressBlock::new(&self.vcn_cidr_block)?;
        if vcn_cidr.family() != AddressFamily::V4 {
            return Err(format!("Config 'vcn_cidr_block' {vcn_cidr} must be an IPv4 block").into());
        }
        if self.subnet_count < SubnetRole::ALL.len() {
            return Err(format!(
                "Config 'subnet_count' {} is below the {} named subnet roles",
                self.subnet_count,
                SubnetRole::ALL.len()
            )
            .into());
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, Box<dyn Error>> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("Invalid timezone '{}': {e}", self.timezone).into())
    }

    /// The configured output file, or `vcn_plan_<stack>_<date>.json`.
    pub fn plan_file_name(&self) -> Result<String, Box<dyn Error>> {
        if let Some(file) = &self.output_file {
            return Ok(file.clone());
        }
        let now = chrono::Utc::now().with_timezone(&self.tz()?);
        Ok(format!(
            "vcn_plan_{}_{}.json",
            self.stack_name,
            now.format("%Y-%m-%d")
        ))
    }
}
