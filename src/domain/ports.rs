use crate::domain::commands::{Command, CommandOutput};
use crate::domain::connector_id::ConnectorId;
use crate::domain::model::{
    ChargeStation, ChargeStationId, ChargeStationView, Connector, Group, GroupId,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// Durable storage for Groups, ChargeStations and Connectors.
///
/// A store hands out one [`StoreSession`] per operation. Nothing a session
/// stages is visible to anyone until [`StoreSession::commit`] succeeds.
pub trait EntityStore: Send + Sync {
    type Session: StoreSession;

    fn begin(&self) -> Self::Session;
}

/// Reads observe committed state; writes are staged on the session and
/// applied together by `commit`. Dropping a session discards its writes.
pub trait StoreSession: Send + Sync {
    fn get_group(&self, id: GroupId) -> impl Future<Output = Result<Option<Group>>> + Send;

    fn get_charge_station(
        &self,
        id: ChargeStationId,
    ) -> impl Future<Output = Result<Option<ChargeStationView>>> + Send;

    fn get_connector(
        &self,
        id: ConnectorId,
        charge_station_id: ChargeStationId,
    ) -> impl Future<Output = Result<Option<Connector>>> + Send;

    fn list_charge_stations(
        &self,
        group_id: GroupId,
    ) -> impl Future<Output = Result<Vec<ChargeStation>>> + Send;

    fn list_connectors(
        &self,
        charge_station_id: ChargeStationId,
    ) -> impl Future<Output = Result<Vec<Connector>>> + Send;

    fn upsert_group(&mut self, group: Group) -> impl Future<Output = Result<()>> + Send;

    fn upsert_charge_station(
        &mut self,
        charge_station: ChargeStation,
    ) -> impl Future<Output = Result<()>> + Send;

    fn upsert_connector(&mut self, connector: Connector) -> impl Future<Output = Result<()>> + Send;

    /// Also removes the Group's ChargeStations and their Connectors.
    fn delete_group(&mut self, id: GroupId) -> impl Future<Output = Result<()>> + Send;

    /// Also removes the ChargeStation's Connectors.
    fn delete_charge_station(
        &mut self,
        id: ChargeStationId,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_connector(
        &mut self,
        id: ConnectorId,
        charge_station_id: ChargeStationId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Applies every staged write atomically and returns the number of
    /// affected rows, cascaded deletes included.
    fn commit(self) -> impl Future<Output = Result<usize>> + Send;
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> Result<CommandOutput>;
}
