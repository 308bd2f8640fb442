//! Capacity accounting for Groups.
//!
//! The ledger never caches: every total is summed from what the session can
//! currently read, so callers must hold the Group's guard from
//! [`GroupLocks`](crate::core::locks::GroupLocks) for the decision to stay
//! valid until their commit.

use crate::domain::model::{ChargeStationId, Group, GroupId};
use crate::domain::ports::StoreSession;
use crate::utils::error::{Result, SmartChargingError};

/// Result of an admission check, with the numbers needed to explain a
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    pub admissible: bool,
    pub capacity: f64,
    pub current_total: f64,
    pub attempted_delta: f64,
}

impl Admission {
    /// Converts a connector-side rejection into
    /// [`SmartChargingError::ConnectorCapacityExceeded`].
    pub fn into_connector_result(self) -> Result<Self> {
        if self.admissible {
            return Ok(self);
        }
        Err(SmartChargingError::ConnectorCapacityExceeded {
            capacity: self.capacity,
            current_total: self.current_total,
            attempted_delta: self.attempted_delta,
        })
    }

    /// Converts a capacity-shrink rejection into
    /// [`SmartChargingError::CapacityDecreaseRejected`]. Here `capacity` is
    /// the requested new capacity.
    pub fn into_capacity_change_result(self, group_id: GroupId) -> Result<Self> {
        if self.admissible {
            return Ok(self);
        }
        Err(SmartChargingError::CapacityDecreaseRejected {
            group: group_id.to_string(),
            new_capacity: self.capacity,
            current_total: self.current_total,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityLedger;

impl CapacityLedger {
    pub async fn compute_group_total<S: StoreSession>(
        &self,
        session: &S,
        group_id: GroupId,
    ) -> Result<f64> {
        let mut total = 0.0;
        for charge_station in session.list_charge_stations(group_id).await? {
            total += self
                .compute_charge_station_total(session, charge_station.identifier)
                .await?;
        }
        Ok(total)
    }

    pub async fn compute_charge_station_total<S: StoreSession>(
        &self,
        session: &S,
        charge_station_id: ChargeStationId,
    ) -> Result<f64> {
        Ok(session
            .list_connectors(charge_station_id)
            .await?
            .iter()
            .map(|c| c.max_current_in_amps)
            .sum())
    }

    /// `signed_delta` is `new - old` for an update and `new` for a create.
    /// A negative delta always reduces the pressure on capacity.
    pub async fn admit_connector_change<S: StoreSession>(
        &self,
        session: &S,
        group: &Group,
        signed_delta: f64,
    ) -> Result<Admission> {
        let current_total = self.compute_group_total(session, group.identifier).await?;
        Ok(Admission {
            admissible: current_total + signed_delta <= group.capacity,
            capacity: group.capacity,
            current_total,
            attempted_delta: signed_delta,
        })
    }

    /// Ignores the Group's stored capacity; only the connectors it owns
    /// right now matter.
    pub async fn admit_group_capacity_change<S: StoreSession>(
        &self,
        session: &S,
        group: &Group,
        new_capacity: f64,
    ) -> Result<Admission> {
        let current_total = self.compute_group_total(session, group.identifier).await?;
        Ok(Admission {
            admissible: new_capacity >= current_total,
            capacity: new_capacity,
            current_total,
            attempted_delta: new_capacity - group.capacity,
        })
    }

    /// Admission for a ChargeStation moving into `target` with all of its
    /// connectors.
    pub async fn admit_station_transfer<S: StoreSession>(
        &self,
        session: &S,
        target: &Group,
        charge_station_id: ChargeStationId,
    ) -> Result<Admission> {
        let station_total = self
            .compute_charge_station_total(session, charge_station_id)
            .await?;
        self.admit_connector_change(session, target, station_total)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::connector_id::ConnectorId;
    use crate::domain::model::{ChargeStation, Connector};
    use crate::domain::ports::EntityStore;

    async fn group_with_connectors(store: &InMemoryStore, capacity: f64, amps: &[f64]) -> Group {
        let group = Group {
            identifier: GroupId::new_v4(),
            name: "Depot".to_string(),
            capacity,
        };
        let charge_station = ChargeStation {
            identifier: ChargeStationId::new_v4(),
            group_identifier: group.identifier,
            name: "North".to_string(),
        };
        let mut session = store.begin();
        session.upsert_group(group.clone()).await.unwrap();
        session
            .upsert_charge_station(charge_station.clone())
            .await
            .unwrap();
        for (i, a) in amps.iter().enumerate() {
            session
                .upsert_connector(Connector {
                    identifier: ConnectorId::new(i as i64 + 1).unwrap(),
                    charge_station_identifier: charge_station.identifier,
                    max_current_in_amps: *a,
                })
                .await
                .unwrap();
        }
        session.commit().await.unwrap();
        group
    }

    #[tokio::test]
    async fn test_group_total_sums_all_connectors() {
        let store = InMemoryStore::new();
        let group = group_with_connectors(&store, 100.0, &[5.0, 7.5, 2.5]).await;

        let total = CapacityLedger
            .compute_group_total(&store.begin(), group.identifier)
            .await
            .unwrap();
        assert_eq!(total, 15.0);
    }

    #[tokio::test]
    async fn test_admission_upper_bound_is_inclusive() {
        let store = InMemoryStore::new();
        let group = group_with_connectors(&store, 10.0, &[5.0]).await;
        let session = store.begin();

        let exact = CapacityLedger
            .admit_connector_change(&session, &group, 5.0)
            .await
            .unwrap();
        assert!(exact.admissible);

        let over = CapacityLedger
            .admit_connector_change(&session, &group, 6.0)
            .await
            .unwrap();
        assert!(!over.admissible);
        assert_eq!(over.current_total, 5.0);
        assert_eq!(over.attempted_delta, 6.0);
    }

    #[tokio::test]
    async fn test_negative_delta_admitted_at_capacity() {
        let store = InMemoryStore::new();
        let group = group_with_connectors(&store, 10.0, &[6.0, 4.0]).await;

        let admission = CapacityLedger
            .admit_connector_change(&store.begin(), &group, -3.0)
            .await
            .unwrap();
        assert!(admission.admissible);
    }

    #[tokio::test]
    async fn test_capacity_change_ignores_prior_capacity() {
        let store = InMemoryStore::new();
        let group = group_with_connectors(&store, 10.0, &[5.0]).await;
        let session = store.begin();

        let shrink = CapacityLedger
            .admit_group_capacity_change(&session, &group, 3.0)
            .await
            .unwrap();
        assert!(!shrink.admissible);
        let err = shrink.into_capacity_change_result(group.identifier).unwrap_err();
        assert!(matches!(
            err,
            SmartChargingError::CapacityDecreaseRejected { current_total, .. } if current_total == 5.0
        ));

        let to_total = CapacityLedger
            .admit_group_capacity_change(&session, &group, 5.0)
            .await
            .unwrap();
        assert!(to_total.admissible);
    }
}
