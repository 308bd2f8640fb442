use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::connector_id::ConnectorId;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(GroupId);
opaque_id!(ChargeStationId);

/// Top-level owner of a current budget in Amps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub identifier: GroupId,
    pub name: String,
    pub capacity: f64,
}

/// A physical unit belonging to exactly one Group. The owning Group is
/// reached through `group_identifier`, never through a held reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStation {
    pub identifier: ChargeStationId,
    pub group_identifier: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub identifier: ConnectorId,
    pub charge_station_identifier: ChargeStationId,
    pub max_current_in_amps: f64,
}

impl Connector {
    pub fn key(&self) -> ConnectorKey {
        ConnectorKey {
            charge_station_identifier: self.charge_station_identifier,
            identifier: self.identifier,
        }
    }
}

/// Composite uniqueness key of a Connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectorKey {
    pub charge_station_identifier: ChargeStationId,
    pub identifier: ConnectorId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeStationView {
    #[serde(flatten)]
    pub charge_station: ChargeStation,
    pub connectors: Vec<Connector>,
}

impl ChargeStationView {
    pub fn total_amps(&self) -> f64 {
        self.connectors.iter().map(|c| c.max_current_in_amps).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    #[serde(flatten)]
    pub group: Group,
    pub charge_stations: Vec<ChargeStationView>,
}

impl GroupView {
    pub fn total_amps(&self) -> f64 {
        self.charge_stations.iter().map(ChargeStationView::total_amps).sum()
    }
}
