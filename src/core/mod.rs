pub mod charge_station;
pub mod connector;
pub mod engine;
pub mod group;
pub mod ledger;
pub mod locks;
pub mod runner;

pub use crate::domain::ports::{CommandHandler, EntityStore, StoreSession};
pub use crate::utils::error::Result;
pub use engine::ChargingEngine;
pub use ledger::{Admission, CapacityLedger};
pub use locks::{GroupGuard, GroupLocks};
pub use runner::{CommandReport, RunSummary, ScriptRunner};
