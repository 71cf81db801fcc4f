//! YAML configuration loading and validation.
//!
//! A run is fully described by one YAML document; every field is checked
//! before any synthesis starts so infeasible parameter combinations are
//! rejected up front with the offending field named.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::Time;

/// PRNG seed used when the config does not specify one.
pub const DEFAULT_SEED: u64 = 42;

/// Simulation time step used when the config does not specify one.
pub const DEFAULT_TIME_STEP: Time = 0.001;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_time_step() -> Time {
    DEFAULT_TIME_STEP
}

/// Simulator configuration.
///
/// `resource_usage` is a per-task count range: each task uses between
/// `resource_usage[0]` and `resource_usage[1]` distinct resources.
/// `deadline_ratio` is accepted and validated but currently unused:
/// deadlines always equal periods.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub num_resources: usize,
    pub num_tasks: usize,
    pub total_utility: f64,
    pub period_range: [f64; 2],
    pub deadline_ratio: [f64; 2],
    pub wcet_ratio: [f64; 2],
    pub high_ratio: f64,
    pub resource_usage: [usize; 2],
    pub cs_factor: f64,
    pub cs_range: [usize; 2],
    pub simulation_time: Time,
    /// PRNG seed; recorded in the schedule artifact for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulation time step (dt). Fixed for the whole run.
    #[serde(default = "default_time_step")]
    pub time_step: Time,
}

/// Errors from loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config document could not be read.
    Read(std::io::Error),
    /// The config document is not valid YAML for [`Config`].
    Parse(serde_yaml::Error),
    /// A field violates its constraint.
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid {field}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Read, parse, and validate a configuration document.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Config::from_yaml(&text)
    }

    /// Parse and validate a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.total_utility > 0.0) {
            return Err(invalid("total_utility", "must be positive"));
        }
        if self.total_utility > self.num_tasks as f64 {
            return Err(invalid(
                "total_utility",
                format!(
                    "{} exceeds num_tasks ({})",
                    self.total_utility, self.num_tasks
                ),
            ));
        }
        if !(self.period_range[0] > 0.0) {
            return Err(invalid("period_range", "lower bound must be positive"));
        }
        if self.period_range[0] > self.period_range[1] {
            return Err(invalid("period_range", "bounds out of order"));
        }
        if !(self.deadline_ratio[0] >= 0.0) {
            return Err(invalid("deadline_ratio", "bounds must be non-negative"));
        }
        if self.deadline_ratio[0] > self.deadline_ratio[1] {
            return Err(invalid("deadline_ratio", "bounds out of order"));
        }
        if !(self.wcet_ratio[0] >= 0.0) {
            return Err(invalid("wcet_ratio", "bounds must be non-negative"));
        }
        if self.wcet_ratio[0] > self.wcet_ratio[1] {
            return Err(invalid("wcet_ratio", "bounds out of order"));
        }
        if !(0.0..=1.0).contains(&self.high_ratio) {
            return Err(invalid("high_ratio", "must be within [0, 1]"));
        }
        if self.resource_usage[0] > self.resource_usage[1] {
            return Err(invalid("resource_usage", "bounds out of order"));
        }
        if self.resource_usage[1] > self.num_resources {
            return Err(invalid(
                "resource_usage",
                format!(
                    "upper bound {} exceeds num_resources ({})",
                    self.resource_usage[1], self.num_resources
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.cs_factor) {
            return Err(invalid("cs_factor", "must be within [0, 1]"));
        }
        if self.cs_range[0] > self.cs_range[1] {
            return Err(invalid("cs_range", "bounds out of order"));
        }
        if !(self.simulation_time >= 0.0) {
            return Err(invalid("simulation_time", "must be non-negative"));
        }
        if !(self.time_step > 0.0) {
            return Err(invalid("time_step", "must be positive"));
        }
        Ok(())
    }
}
