pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::InMemoryStore;
pub use config::{CommandScript, EngineConfig};
pub use crate::core::{ChargingEngine, RunSummary, ScriptRunner};
pub use domain::commands::{Command, CommandOutput, SaveMode, SaveOutcome, SaveStatus};
pub use domain::connector_id::ConnectorId;
pub use domain::model::{ChargeStationId, GroupId};
pub use utils::error::{ErrorCategory, Result, SmartChargingError};
