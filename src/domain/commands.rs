use serde::{Deserialize, Serialize};

use crate::domain::model::{
    ChargeStation, ChargeStationId, ChargeStationView, Connector, Group, GroupId, GroupView,
};

/// How a Save command treats an identifier that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Reject with `DuplicateEntity` when the identifier is taken.
    StrictCreate,
    /// Insert when absent, update in place when present.
    #[default]
    Upsert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGroup {
    pub identifier: GroupId,
    pub name: String,
    pub capacity: f64,
    #[serde(default)]
    pub mode: SaveMode,
}

impl SaveGroup {
    pub fn create(identifier: GroupId, name: impl Into<String>, capacity: f64) -> Self {
        Self {
            identifier,
            name: name.into(),
            capacity,
            mode: SaveMode::StrictCreate,
        }
    }

    pub fn upsert(identifier: GroupId, name: impl Into<String>, capacity: f64) -> Self {
        Self {
            mode: SaveMode::Upsert,
            ..Self::create(identifier, name, capacity)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveChargeStation {
    pub identifier: ChargeStationId,
    pub group_identifier: GroupId,
    pub name: String,
    #[serde(default)]
    pub mode: SaveMode,
}

impl SaveChargeStation {
    pub fn create(
        identifier: ChargeStationId,
        group_identifier: GroupId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            group_identifier,
            name: name.into(),
            mode: SaveMode::StrictCreate,
        }
    }

    pub fn upsert(
        identifier: ChargeStationId,
        group_identifier: GroupId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            mode: SaveMode::Upsert,
            ..Self::create(identifier, group_identifier, name)
        }
    }
}

/// `identifier` stays a raw integer here; it is checked against the
/// connector identifier policy by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveConnector {
    pub identifier: i64,
    pub charge_station_identifier: ChargeStationId,
    pub max_current_in_amps: f64,
    #[serde(default)]
    pub mode: SaveMode,
}

impl SaveConnector {
    pub fn create(
        identifier: i64,
        charge_station_identifier: ChargeStationId,
        max_current_in_amps: f64,
    ) -> Self {
        Self {
            identifier,
            charge_station_identifier,
            max_current_in_amps,
            mode: SaveMode::StrictCreate,
        }
    }

    pub fn upsert(
        identifier: i64,
        charge_station_identifier: ChargeStationId,
        max_current_in_amps: f64,
    ) -> Self {
        Self {
            mode: SaveMode::Upsert,
            ..Self::create(identifier, charge_station_identifier, max_current_in_amps)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Created,
    Updated,
}

/// The persisted state of an entity after a successful Save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome<T> {
    pub entity: T,
    pub status: SaveStatus,
}

impl<T> SaveOutcome<T> {
    pub fn created(entity: T) -> Self {
        Self {
            entity,
            status: SaveStatus::Created,
        }
    }

    pub fn updated(entity: T) -> Self {
        Self {
            entity,
            status: SaveStatus::Updated,
        }
    }
}

/// Every operation the engine accepts, in a form a script or transport
/// layer can deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    SaveGroup(SaveGroup),
    SaveChargeStation(SaveChargeStation),
    SaveConnector(SaveConnector),
    DeleteGroup {
        identifier: GroupId,
    },
    DeleteChargeStation {
        identifier: ChargeStationId,
    },
    DeleteConnector {
        identifier: i64,
        charge_station_identifier: ChargeStationId,
    },
    GetGroup {
        identifier: GroupId,
    },
    GetChargeStation {
        identifier: ChargeStationId,
    },
    GetConnector {
        identifier: i64,
        charge_station_identifier: ChargeStationId,
    },
    GroupTotal {
        identifier: GroupId,
    },
    ChargeStationTotal {
        identifier: ChargeStationId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutput {
    Group(SaveOutcome<Group>),
    ChargeStation(SaveOutcome<ChargeStation>),
    Connector(SaveOutcome<Connector>),
    Deleted { affected: usize },
    GroupView { view: Option<GroupView> },
    ChargeStationView { view: Option<ChargeStationView> },
    ConnectorView { view: Option<Connector> },
    Total { amps: f64 },
}
