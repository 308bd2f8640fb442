use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate, Violations};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "smart-charging")]
#[command(about = "Replays a command script against the capacity engine")]
pub struct CliConfig {
    /// TOML file with `[[commands]]` entries.
    pub script: String,

    #[arg(long, help = "Engine configuration file (TOML)")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json: bool,

    #[arg(long, help = "Stop at the first failed command")]
    pub fail_fast: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let mut violations = Violations::new("CliConfig");
        violations.check(validate_path("script", &self.script));
        if let Some(config) = &self.config {
            violations.check(validate_path("config", config));
        }
        violations.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = CliConfig::parse_from([
            "smart-charging",
            "commands.toml",
            "--config",
            "engine.toml",
            "--verbose",
        ]);
        assert_eq!(cli.script, "commands.toml");
        assert_eq!(cli.config.as_deref(), Some("engine.toml"));
        assert!(cli.verbose);
        assert!(!cli.json);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_empty_script_path_is_rejected() {
        let cli = CliConfig::parse_from(["smart-charging", ""]);
        assert!(cli.validate().is_err());
    }
}
