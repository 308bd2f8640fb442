use crate::config::substitute_env_vars;
use crate::domain::commands::Command;
use crate::utils::error::{Result, SmartChargingError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An ordered list of commands read from TOML:
///
/// ```toml
/// [[commands]]
/// op = "save_group"
/// identifier = "6f1c..."
/// name = "Depot"
/// capacity = 64.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandScript {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl CommandScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| SmartChargingError::ConfigError {
            message: format!("script parsing error: {}", e),
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::{SaveConnector, SaveMode};
    use crate::domain::model::GroupId;

    const GROUP: &str = "0b6a3c2e-5d8f-4a71-9a65-0f3c1e2d4b5a";
    const STATION: &str = "9d2f7e14-3c6b-4e8a-b1d0-7a5c9e3f2b61";

    #[test]
    fn test_parses_every_command_shape() {
        let script = CommandScript::from_toml_str(&format!(
            r#"
[[commands]]
op = "save_group"
identifier = "{GROUP}"
name = "Depot"
capacity = 64

[[commands]]
op = "save_charge_station"
identifier = "{STATION}"
group_identifier = "{GROUP}"
name = "North"
mode = "strict_create"

[[commands]]
op = "save_connector"
identifier = 1
charge_station_identifier = "{STATION}"
max_current_in_amps = 16.0

[[commands]]
op = "group_total"
identifier = "{GROUP}"

[[commands]]
op = "get_connector"
identifier = 1
charge_station_identifier = "{STATION}"

[[commands]]
op = "delete_connector"
identifier = 1
charge_station_identifier = "{STATION}"
"#
        ))
        .unwrap();

        assert_eq!(script.len(), 6);
        let group_id: GroupId = GROUP.parse().unwrap();
        match &script.commands[0] {
            Command::SaveGroup(cmd) => {
                assert_eq!(cmd.identifier, group_id);
                assert_eq!(cmd.capacity, 64.0);
                assert_eq!(cmd.mode, SaveMode::Upsert);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match &script.commands[1] {
            Command::SaveChargeStation(cmd) => assert_eq!(cmd.mode, SaveMode::StrictCreate),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(
            script.commands[2],
            Command::SaveConnector(SaveConnector::upsert(
                1,
                STATION.parse().unwrap(),
                16.0
            ))
        );
        assert_eq!(
            script.commands[3],
            Command::GroupTotal {
                identifier: group_id
            }
        );
        assert!(matches!(
            script.commands[4],
            Command::GetConnector { identifier: 1, .. }
        ));
    }

    #[test]
    fn test_unknown_op_is_config_error() {
        let err = CommandScript::from_toml_str("[[commands]]\nop = \"explode\"\n").unwrap_err();
        assert!(matches!(err, SmartChargingError::ConfigError { .. }));
    }

    #[test]
    fn test_empty_script() {
        assert!(CommandScript::from_toml_str("").unwrap().is_empty());
    }
}
