#[cfg(feature = "cli")]
pub mod cli;
pub mod script;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use script::CommandScript;

use crate::utils::error::{Result, SmartChargingError};
use crate::utils::validation::{
    validate_below, validate_non_empty_string, validate_positive_amps, FieldViolation, Validate,
    Violations,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest Group capacity accepted when no config overrides it.
pub const DEFAULT_MAX_GROUP_CAPACITY: f64 = f32::MAX as f64;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub name: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            name: "smart-charging".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Exclusive upper bound for `Group.capacity`.
    pub max_group_capacity: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_group_capacity: DEFAULT_MAX_GROUP_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let config: Self = toml::from_str(&processed).map_err(|e| SmartChargingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn max_group_capacity(&self) -> f64 {
        self.capacity.max_group_capacity
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::new("EngineConfig");
        violations
            .check(validate_non_empty_string("engine.name", &self.engine.name))
            .check(validate_positive_amps(
                "capacity.max_group_capacity",
                self.capacity.max_group_capacity,
            ))
            .check(validate_below(
                "capacity.max_group_capacity",
                self.capacity.max_group_capacity,
                f64::MAX,
            ));
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            violations.check(Err(FieldViolation::new(
                "logging.level",
                &self.logging.level,
                format!("Valid levels: {}", LOG_LEVELS.join(", ")),
            )));
        }
        violations.into_result()
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables are
/// left as written.
pub(crate) fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SmartChargingError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}
