use std::sync::Arc;

use crate::core::ledger::CapacityLedger;
use crate::core::locks::GroupLocks;
use crate::domain::commands::{SaveGroup, SaveMode, SaveOutcome};
use crate::domain::model::{Group, GroupId};
use crate::domain::ports::{EntityStore, StoreSession};
use crate::utils::error::{Result, SmartChargingError};
use crate::utils::validation::{
    validate_below, validate_non_empty_string, validate_positive_amps, Violations,
};

pub struct GroupCoordinator<S: EntityStore> {
    store: Arc<S>,
    locks: GroupLocks,
    ledger: CapacityLedger,
    max_capacity: f64,
}

impl<S: EntityStore> GroupCoordinator<S> {
    pub fn new(store: Arc<S>, locks: GroupLocks, max_capacity: f64) -> Self {
        Self {
            store,
            locks,
            ledger: CapacityLedger,
            max_capacity,
        }
    }

    fn validate(&self, command: &SaveGroup) -> Result<()> {
        let mut violations = Violations::new("Group");
        violations.check(validate_non_empty_string("name", &command.name));
        if violations
            .check_value(validate_positive_amps("capacity", command.capacity))
            .is_some()
        {
            violations.check(validate_below("capacity", command.capacity, self.max_capacity));
        }
        violations.into_result()
    }

    /// Creates the Group, or updates it when `command.mode` is
    /// [`SaveMode::Upsert`] and the identifier exists. A capacity lower than
    /// what the Group's connectors already draw is rejected.
    pub async fn save(&self, command: SaveGroup) -> Result<SaveOutcome<Group>> {
        self.validate(&command)?;

        tracing::info!(
            "Trying to save group '{}' with name '{}' ({:?})",
            command.identifier,
            command.name,
            command.mode
        );

        let group = Group {
            identifier: command.identifier,
            name: command.name,
            capacity: command.capacity,
        };

        let _guard = self.locks.lock(group.identifier).await;
        let mut session = self.store.begin();

        let outcome = match session.get_group(group.identifier).await? {
            None => {
                session.upsert_group(group.clone()).await?;
                SaveOutcome::created(group)
            }
            Some(_) if command.mode == SaveMode::StrictCreate => {
                tracing::warn!("Rejected duplicate group '{}'", group.identifier);
                return Err(SmartChargingError::DuplicateEntity {
                    entity: "Group",
                    identifier: group.identifier.to_string(),
                });
            }
            Some(existing) => {
                let admission = self
                    .ledger
                    .admit_group_capacity_change(&session, &existing, group.capacity)
                    .await?;
                if let Err(e) = admission.into_capacity_change_result(group.identifier) {
                    tracing::warn!("{}", e);
                    return Err(e);
                }

                let owned = session.list_charge_stations(group.identifier).await?;
                tracing::debug!(
                    "Group '{}' keeps {} charge stations, capacity {} -> {}",
                    group.identifier,
                    owned.len(),
                    existing.capacity,
                    group.capacity
                );

                session.upsert_group(group.clone()).await?;
                SaveOutcome::updated(group)
            }
        };

        session.commit().await?;
        tracing::info!(
            "Group '{}' {:?}",
            outcome.entity.identifier,
            outcome.status
        );
        Ok(outcome)
    }

    /// Removes the Group together with its ChargeStations and their
    /// Connectors. Deleting an absent Group is a no-op returning 0.
    pub async fn delete(&self, group_id: GroupId) -> Result<usize> {
        let _guard = self.locks.lock(group_id).await;
        let mut session = self.store.begin();

        if session.get_group(group_id).await?.is_none() {
            tracing::debug!("Group '{}' already absent", group_id);
            return Ok(0);
        }

        session.delete_group(group_id).await?;
        let affected = session.commit().await?;

        tracing::info!("Removed group '{}' ({} rows)", group_id, affected);
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::commands::SaveStatus;
    use tokio_test::{assert_err, assert_ok};

    fn coordinator() -> GroupCoordinator<InMemoryStore> {
        GroupCoordinator::new(
            Arc::new(InMemoryStore::new()),
            GroupLocks::new(),
            f64::from(f32::MAX),
        )
    }

    #[tokio::test]
    async fn test_upsert_inserts_when_absent() {
        let groups = coordinator();
        let id = GroupId::new_v4();

        let outcome = assert_ok!(groups.save(SaveGroup::upsert(id, "Depot", 32.0)).await);
        assert_eq!(outcome.status, SaveStatus::Created);
        assert_eq!(outcome.entity.capacity, 32.0);
    }

    #[tokio::test]
    async fn test_update_changes_name_and_capacity() {
        let groups = coordinator();
        let id = GroupId::new_v4();
        assert_ok!(groups.save(SaveGroup::create(id, "Depot", 32.0)).await);

        let outcome = assert_ok!(groups.save(SaveGroup::upsert(id, "Garage", 64.0)).await);
        assert_eq!(outcome.status, SaveStatus::Updated);
        assert_eq!(outcome.entity.name, "Garage");
        assert_eq!(outcome.entity.capacity, 64.0);
    }

    #[tokio::test]
    async fn test_validation_reports_every_field() {
        let groups = coordinator();
        let err = assert_err!(
            groups
                .save(SaveGroup::create(GroupId::new_v4(), " ", -1.0))
                .await
        );
        match err {
            SmartChargingError::Validation { violations, .. } => assert_eq!(violations.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capacity_must_stay_below_maximum() {
        let groups = GroupCoordinator::new(Arc::new(InMemoryStore::new()), GroupLocks::new(), 100.0);
        assert_err!(
            groups
                .save(SaveGroup::create(GroupId::new_v4(), "Depot", 100.0))
                .await
        );
    }

    #[tokio::test]
    async fn test_infinite_capacity_is_one_violation() {
        let groups = coordinator();
        let err = assert_err!(
            groups
                .save(SaveGroup::create(GroupId::new_v4(), "Depot", f64::INFINITY))
                .await
        );
        match err {
            SmartChargingError::Validation { violations, .. } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].starts_with("capacity"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_absent_group_is_noop() {
        let groups = coordinator();
        assert_eq!(assert_ok!(groups.delete(GroupId::new_v4()).await), 0);
    }
}
