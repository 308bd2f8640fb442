use async_trait::async_trait;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::core::charge_station::ChargeStationCoordinator;
use crate::core::connector::ConnectorCoordinator;
use crate::core::group::GroupCoordinator;
use crate::core::ledger::CapacityLedger;
use crate::core::locks::GroupLocks;
use crate::domain::commands::{Command, CommandOutput};
use crate::domain::connector_id::ConnectorId;
use crate::domain::model::{
    ChargeStationId, ChargeStationView, Connector, GroupId, GroupView,
};
use crate::domain::ports::{CommandHandler, EntityStore, StoreSession};
use crate::utils::error::{Result, SmartChargingError};

/// One store, one lock registry, three coordinators.
pub struct ChargingEngine<S: EntityStore> {
    store: Arc<S>,
    ledger: CapacityLedger,
    groups: GroupCoordinator<S>,
    charge_stations: ChargeStationCoordinator<S>,
    connectors: ConnectorCoordinator<S>,
}

impl<S: EntityStore> ChargingEngine<S> {
    pub fn new(store: S, config: &EngineConfig) -> Self {
        let store = Arc::new(store);
        let locks = GroupLocks::new();
        Self {
            groups: GroupCoordinator::new(
                Arc::clone(&store),
                locks.clone(),
                config.max_group_capacity(),
            ),
            charge_stations: ChargeStationCoordinator::new(Arc::clone(&store), locks.clone()),
            connectors: ConnectorCoordinator::new(Arc::clone(&store), locks),
            ledger: CapacityLedger,
            store,
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, &EngineConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn groups(&self) -> &GroupCoordinator<S> {
        &self.groups
    }

    pub fn charge_stations(&self) -> &ChargeStationCoordinator<S> {
        &self.charge_stations
    }

    pub fn connectors(&self) -> &ConnectorCoordinator<S> {
        &self.connectors
    }

    pub async fn group(&self, id: GroupId) -> Result<Option<GroupView>> {
        let session = self.store.begin();
        let Some(group) = session.get_group(id).await? else {
            return Ok(None);
        };

        let mut charge_stations = Vec::new();
        for charge_station in session.list_charge_stations(id).await? {
            let connectors = session.list_connectors(charge_station.identifier).await?;
            charge_stations.push(ChargeStationView {
                charge_station,
                connectors,
            });
        }

        Ok(Some(GroupView {
            group,
            charge_stations,
        }))
    }

    pub async fn charge_station(&self, id: ChargeStationId) -> Result<Option<ChargeStationView>> {
        self.store.begin().get_charge_station(id).await
    }

    pub async fn connector(
        &self,
        id: ConnectorId,
        charge_station_id: ChargeStationId,
    ) -> Result<Option<Connector>> {
        self.store.begin().get_connector(id, charge_station_id).await
    }

    pub async fn group_total_amps(&self, id: GroupId) -> Result<f64> {
        let session = self.store.begin();
        if session.get_group(id).await?.is_none() {
            return Err(SmartChargingError::NotFound {
                entity: "Group",
                identifier: id.to_string(),
            });
        }
        self.ledger.compute_group_total(&session, id).await
    }

    pub async fn charge_station_total_amps(&self, id: ChargeStationId) -> Result<f64> {
        let session = self.store.begin();
        if session.get_charge_station(id).await?.is_none() {
            return Err(SmartChargingError::NotFound {
                entity: "Charge Station",
                identifier: id.to_string(),
            });
        }
        self.ledger.compute_charge_station_total(&session, id).await
    }
}

#[async_trait]
impl<S: EntityStore + 'static> CommandHandler for ChargingEngine<S> {
    async fn handle(&self, command: Command) -> Result<CommandOutput> {
        match command {
            Command::SaveGroup(cmd) => self.groups.save(cmd).await.map(CommandOutput::Group),
            Command::SaveChargeStation(cmd) => self
                .charge_stations
                .save(cmd)
                .await
                .map(CommandOutput::ChargeStation),
            Command::SaveConnector(cmd) => {
                self.connectors.save(cmd).await.map(CommandOutput::Connector)
            }
            Command::DeleteGroup { identifier } => self
                .groups
                .delete(identifier)
                .await
                .map(|affected| CommandOutput::Deleted { affected }),
            Command::DeleteChargeStation { identifier } => self
                .charge_stations
                .delete(identifier)
                .await
                .map(|affected| CommandOutput::Deleted { affected }),
            Command::DeleteConnector {
                identifier,
                charge_station_identifier,
            } => self
                .connectors
                .delete(identifier, charge_station_identifier)
                .await
                .map(|affected| CommandOutput::Deleted { affected }),
            Command::GetGroup { identifier } => self
                .group(identifier)
                .await
                .map(|view| CommandOutput::GroupView { view }),
            Command::GetChargeStation { identifier } => self
                .charge_station(identifier)
                .await
                .map(|view| CommandOutput::ChargeStationView { view }),
            Command::GetConnector {
                identifier,
                charge_station_identifier,
            } => {
                // An identifier outside the legal range names no connector.
                let view = match ConnectorId::new(identifier) {
                    Ok(id) => self.connector(id, charge_station_identifier).await?,
                    Err(_) => None,
                };
                Ok(CommandOutput::ConnectorView { view })
            }
            Command::GroupTotal { identifier } => self
                .group_total_amps(identifier)
                .await
                .map(|amps| CommandOutput::Total { amps }),
            Command::ChargeStationTotal { identifier } => self
                .charge_station_total_amps(identifier)
                .await
                .map(|amps| CommandOutput::Total { amps }),
        }
    }
}
