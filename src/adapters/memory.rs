//! In-memory arena implementation of [`EntityStore`].
//!
//! Each entity kind lives in its own table keyed by identifier; children
//! point at parents through their foreign-key fields only. A commit stages
//! every write onto a copy of the tables, checks referential integrity and
//! swaps the copy in under a single write guard.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::connector_id::ConnectorId;
use crate::domain::model::{
    ChargeStation, ChargeStationId, ChargeStationView, Connector, ConnectorKey, Group, GroupId,
};
use crate::domain::ports::{EntityStore, StoreSession};
use crate::utils::error::{Result, SmartChargingError};

#[derive(Debug, Clone, Default)]
struct Tables {
    groups: BTreeMap<GroupId, Group>,
    charge_stations: BTreeMap<ChargeStationId, ChargeStation>,
    connectors: BTreeMap<ConnectorKey, Connector>,
}

impl Tables {
    fn connectors_of(&self, charge_station_id: ChargeStationId) -> Vec<Connector> {
        self.connectors
            .values()
            .filter(|c| c.charge_station_identifier == charge_station_id)
            .cloned()
            .collect()
    }

    fn remove_charge_station(&mut self, id: ChargeStationId) -> usize {
        if self.charge_stations.remove(&id).is_none() {
            return 0;
        }
        let before = self.connectors.len();
        self.connectors
            .retain(|key, _| key.charge_station_identifier != id);
        1 + before - self.connectors.len()
    }

    fn remove_group(&mut self, id: GroupId) -> usize {
        if self.groups.remove(&id).is_none() {
            return 0;
        }
        let owned: Vec<ChargeStationId> = self
            .charge_stations
            .values()
            .filter(|cs| cs.group_identifier == id)
            .map(|cs| cs.identifier)
            .collect();
        1 + owned
            .into_iter()
            .map(|cs| self.remove_charge_station(cs))
            .sum::<usize>()
    }

    fn apply(&mut self, write: StagedWrite) -> Result<usize> {
        match write {
            StagedWrite::UpsertGroup(group) => {
                self.groups.insert(group.identifier, group);
                Ok(1)
            }
            StagedWrite::UpsertChargeStation(charge_station) => {
                if !self.groups.contains_key(&charge_station.group_identifier) {
                    return Err(SmartChargingError::Storage {
                        message: format!(
                            "charge station {} references missing group {}",
                            charge_station.identifier, charge_station.group_identifier
                        ),
                    });
                }
                self.charge_stations
                    .insert(charge_station.identifier, charge_station);
                Ok(1)
            }
            StagedWrite::UpsertConnector(connector) => {
                if !self
                    .charge_stations
                    .contains_key(&connector.charge_station_identifier)
                {
                    return Err(SmartChargingError::Storage {
                        message: format!(
                            "connector {} references missing charge station {}",
                            connector.identifier, connector.charge_station_identifier
                        ),
                    });
                }
                self.connectors.insert(connector.key(), connector);
                Ok(1)
            }
            StagedWrite::DeleteGroup(id) => Ok(self.remove_group(id)),
            StagedWrite::DeleteChargeStation(id) => Ok(self.remove_charge_station(id)),
            StagedWrite::DeleteConnector(key) => {
                Ok(usize::from(self.connectors.remove(&key).is_some()))
            }
        }
    }
}

#[derive(Debug, Clone)]
enum StagedWrite {
    UpsertGroup(Group),
    UpsertChargeStation(ChargeStation),
    UpsertConnector(Connector),
    DeleteGroup(GroupId),
    DeleteChargeStation(ChargeStationId),
    DeleteConnector(ConnectorKey),
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_count(&self) -> usize {
        self.tables.read().groups.len()
    }

    pub fn charge_station_count(&self) -> usize {
        self.tables.read().charge_stations.len()
    }

    pub fn connector_count(&self) -> usize {
        self.tables.read().connectors.len()
    }
}

impl EntityStore for InMemoryStore {
    type Session = MemorySession;

    fn begin(&self) -> MemorySession {
        MemorySession {
            tables: Arc::clone(&self.tables),
            staged: Vec::new(),
        }
    }
}

pub struct MemorySession {
    tables: Arc<RwLock<Tables>>,
    staged: Vec<StagedWrite>,
}

impl MemorySession {
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

impl StoreSession for MemorySession {
    async fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self.tables.read().groups.get(&id).cloned())
    }

    async fn get_charge_station(&self, id: ChargeStationId) -> Result<Option<ChargeStationView>> {
        let tables = self.tables.read();
        Ok(tables.charge_stations.get(&id).map(|cs| ChargeStationView {
            charge_station: cs.clone(),
            connectors: tables.connectors_of(id),
        }))
    }

    async fn get_connector(
        &self,
        id: ConnectorId,
        charge_station_id: ChargeStationId,
    ) -> Result<Option<Connector>> {
        let key = ConnectorKey {
            charge_station_identifier: charge_station_id,
            identifier: id,
        };
        Ok(self.tables.read().connectors.get(&key).cloned())
    }

    async fn list_charge_stations(&self, group_id: GroupId) -> Result<Vec<ChargeStation>> {
        Ok(self
            .tables
            .read()
            .charge_stations
            .values()
            .filter(|cs| cs.group_identifier == group_id)
            .cloned()
            .collect())
    }

    async fn list_connectors(&self, charge_station_id: ChargeStationId) -> Result<Vec<Connector>> {
        Ok(self.tables.read().connectors_of(charge_station_id))
    }

    async fn upsert_group(&mut self, group: Group) -> Result<()> {
        self.staged.push(StagedWrite::UpsertGroup(group));
        Ok(())
    }

    async fn upsert_charge_station(&mut self, charge_station: ChargeStation) -> Result<()> {
        self.staged
            .push(StagedWrite::UpsertChargeStation(charge_station));
        Ok(())
    }

    async fn upsert_connector(&mut self, connector: Connector) -> Result<()> {
        self.staged.push(StagedWrite::UpsertConnector(connector));
        Ok(())
    }

    async fn delete_group(&mut self, id: GroupId) -> Result<()> {
        self.staged.push(StagedWrite::DeleteGroup(id));
        Ok(())
    }

    async fn delete_charge_station(&mut self, id: ChargeStationId) -> Result<()> {
        self.staged.push(StagedWrite::DeleteChargeStation(id));
        Ok(())
    }

    async fn delete_connector(
        &mut self,
        id: ConnectorId,
        charge_station_id: ChargeStationId,
    ) -> Result<()> {
        self.staged.push(StagedWrite::DeleteConnector(ConnectorKey {
            charge_station_identifier: charge_station_id,
            identifier: id,
        }));
        Ok(())
    }

    async fn commit(self) -> Result<usize> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let mut tables = self.tables.write();
        let mut next = tables.clone();
        let mut affected = 0;
        for write in self.staged {
            affected += next.apply(write)?;
        }
        *tables = next;

        tracing::debug!("Committed session ({} rows affected)", affected);
        Ok(affected)
    }
}
