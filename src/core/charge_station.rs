use std::sync::Arc;

use crate::core::ledger::CapacityLedger;
use crate::core::locks::{GroupGuard, GroupLocks};
use crate::domain::commands::{SaveChargeStation, SaveMode, SaveOutcome};
use crate::domain::model::{ChargeStation, ChargeStationId, ChargeStationView};
use crate::domain::ports::{EntityStore, StoreSession};
use crate::utils::error::{Result, SmartChargingError};
use crate::utils::validation::{validate_non_empty_string, Violations};

pub struct ChargeStationCoordinator<S: EntityStore> {
    store: Arc<S>,
    locks: GroupLocks,
    ledger: CapacityLedger,
}

impl<S: EntityStore> ChargeStationCoordinator<S> {
    pub fn new(store: Arc<S>, locks: GroupLocks) -> Self {
        Self {
            store,
            locks,
            ledger: CapacityLedger,
        }
    }

    /// Locks the requested Group and, for an existing station, its current
    /// owner. Loops if the station changed owner before the locks were held.
    async fn lock_groups(
        &self,
        session: &S::Session,
        command: &SaveChargeStation,
    ) -> Result<(Option<ChargeStationView>, GroupGuard)> {
        let mut existing = session.get_charge_station(command.identifier).await?;
        loop {
            let mut wanted = vec![command.group_identifier];
            if let Some(view) = &existing {
                wanted.push(view.charge_station.group_identifier);
            }
            let guard = self.locks.lock_all(&wanted).await;

            let current = session.get_charge_station(command.identifier).await?;
            let stable = match &current {
                None => true,
                Some(view) => guard.covers(view.charge_station.group_identifier),
            };
            if stable {
                return Ok((current, guard));
            }
            existing = current;
        }
    }

    /// Creates or updates a ChargeStation. Moving an existing station to a
    /// different Group admits its whole connector draw against the new Group.
    pub async fn save(&self, command: SaveChargeStation) -> Result<SaveOutcome<ChargeStation>> {
        let mut violations = Violations::new("ChargeStation");
        violations.check(validate_non_empty_string("name", &command.name));
        violations.into_result()?;

        tracing::info!(
            "Trying to save charge station '{}' for group '{}' ({:?})",
            command.identifier,
            command.group_identifier,
            command.mode
        );

        let mut session = self.store.begin();
        let (existing, _guard) = self.lock_groups(&session, &command).await?;

        let Some(group) = session.get_group(command.group_identifier).await? else {
            tracing::warn!(
                "Group '{}' not found for charge station '{}'",
                command.group_identifier,
                command.identifier
            );
            return Err(SmartChargingError::NotFoundDependency {
                entity: "Charge Station",
                dependency: "Group",
                identifier: command.group_identifier.to_string(),
            });
        };

        let charge_station = ChargeStation {
            identifier: command.identifier,
            group_identifier: group.identifier,
            name: command.name,
        };

        let outcome = match existing {
            None => {
                session
                    .upsert_charge_station(charge_station.clone())
                    .await?;
                SaveOutcome::created(charge_station)
            }
            Some(_) if command.mode == SaveMode::StrictCreate => {
                tracing::warn!("Rejected duplicate charge station '{}'", command.identifier);
                return Err(SmartChargingError::DuplicateEntity {
                    entity: "ChargeStation",
                    identifier: command.identifier.to_string(),
                });
            }
            Some(view) => {
                let previous_group = view.charge_station.group_identifier;
                if previous_group != group.identifier {
                    let admission = self
                        .ledger
                        .admit_station_transfer(&session, &group, command.identifier)
                        .await?;
                    if let Err(e) = admission.into_connector_result() {
                        tracing::warn!(
                            "Cannot move charge station '{}' to group '{}': {}",
                            command.identifier,
                            group.identifier,
                            e
                        );
                        return Err(e);
                    }
                    tracing::debug!(
                        "Moving charge station '{}' from group '{}' to '{}' with {} A",
                        command.identifier,
                        previous_group,
                        group.identifier,
                        admission.attempted_delta
                    );
                }

                session
                    .upsert_charge_station(charge_station.clone())
                    .await?;
                SaveOutcome::updated(charge_station)
            }
        };

        session.commit().await?;
        tracing::info!(
            "Charge station '{}' {:?}",
            outcome.entity.identifier,
            outcome.status
        );
        Ok(outcome)
    }

    /// Removes the ChargeStation and every Connector it owns in one commit.
    /// Deleting an absent station is a no-op returning 0.
    pub async fn delete(&self, charge_station_id: ChargeStationId) -> Result<usize> {
        let mut session = self.store.begin();
        let Some((view, _guard)) = self
            .locks
            .lock_station_owner(&session, charge_station_id)
            .await?
        else {
            tracing::debug!("Charge station '{}' already absent", charge_station_id);
            return Ok(0);
        };

        session.delete_charge_station(charge_station_id).await?;
        let affected = session.commit().await?;

        tracing::info!(
            "Removed charge station '{}' with {} connectors",
            charge_station_id,
            view.connectors.len()
        );
        Ok(affected)
    }
}
