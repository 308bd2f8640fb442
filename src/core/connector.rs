use std::sync::Arc;

use crate::core::ledger::CapacityLedger;
use crate::core::locks::GroupLocks;
use crate::domain::commands::{SaveConnector, SaveMode, SaveOutcome};
use crate::domain::connector_id::ConnectorId;
use crate::domain::model::{ChargeStationId, Connector};
use crate::domain::ports::{EntityStore, StoreSession};
use crate::utils::error::{Result, SmartChargingError};
use crate::utils::validation::{validate_positive_amps, Violations};

pub struct ConnectorCoordinator<S: EntityStore> {
    store: Arc<S>,
    locks: GroupLocks,
    ledger: CapacityLedger,
}

impl<S: EntityStore> ConnectorCoordinator<S> {
    pub fn new(store: Arc<S>, locks: GroupLocks) -> Self {
        Self {
            store,
            locks,
            ledger: CapacityLedger,
        }
    }

    /// Creates or updates a Connector.
    ///
    /// The change in draw is `new - old` for an existing connector and the
    /// full amount for a new one; it must fit in the owning Group's capacity
    /// as summed under the Group's lock. Nothing is written on rejection.
    pub async fn save(&self, command: SaveConnector) -> Result<SaveOutcome<Connector>> {
        tracing::info!(
            "Trying to save connector {} on charge station '{}' ({:?})",
            command.identifier,
            command.charge_station_identifier,
            command.mode
        );

        let mut session = self.store.begin();
        let Some((charge_station, _guard)) = self
            .locks
            .lock_station_owner(&session, command.charge_station_identifier)
            .await?
        else {
            return Err(SmartChargingError::NotFoundDependency {
                entity: "Connector",
                dependency: "Charge Station",
                identifier: command.charge_station_identifier.to_string(),
            });
        };

        let group_id = charge_station.charge_station.group_identifier;
        let Some(group) = session.get_group(group_id).await? else {
            tracing::error!(
                "Charge station '{}' points at missing group '{}'",
                command.charge_station_identifier,
                group_id
            );
            return Err(SmartChargingError::NotFoundDependency {
                entity: "Connector",
                dependency: "Group",
                identifier: group_id.to_string(),
            });
        };

        let mut violations = Violations::new("Connector");
        let identifier = violations.check_value(ConnectorId::new(command.identifier));
        violations.check(validate_positive_amps(
            "max_current_in_amps",
            command.max_current_in_amps,
        ));
        let identifier = violations.into_value(identifier)?;

        let existing = session
            .get_connector(identifier, command.charge_station_identifier)
            .await?;
        let signed_delta = match &existing {
            Some(previous) => command.max_current_in_amps - previous.max_current_in_amps,
            None => command.max_current_in_amps,
        };
        tracing::debug!(
            "Connector {} on '{}' changes group '{}' draw by {}",
            identifier,
            command.charge_station_identifier,
            group_id,
            signed_delta
        );

        let admission = self
            .ledger
            .admit_connector_change(&session, &group, signed_delta)
            .await?;
        if let Err(e) = admission.into_connector_result() {
            tracing::warn!("{}", e);
            return Err(e);
        }

        if existing.is_some() && command.mode == SaveMode::StrictCreate {
            tracing::warn!(
                "Rejected duplicate connector {} on charge station '{}'",
                identifier,
                command.charge_station_identifier
            );
            return Err(SmartChargingError::DuplicateEntity {
                entity: "Connector in ChargeStation",
                identifier: identifier.to_string(),
            });
        }

        let connector = Connector {
            identifier,
            charge_station_identifier: command.charge_station_identifier,
            max_current_in_amps: command.max_current_in_amps,
        };
        session.upsert_connector(connector.clone()).await?;
        session.commit().await?;

        let outcome = match existing {
            Some(_) => SaveOutcome::updated(connector),
            None => SaveOutcome::created(connector),
        };
        tracing::info!(
            "Connector {} on '{}' {:?}, group '{}' now draws {} of {}",
            identifier,
            command.charge_station_identifier,
            outcome.status,
            group_id,
            admission.current_total + signed_delta,
            group.capacity
        );
        Ok(outcome)
    }

    /// Removes a Connector by its composite key. An absent connector or
    /// charge station is a no-op returning 0, and so is an identifier
    /// outside the legal range.
    pub async fn delete(&self, identifier: i64, charge_station_id: ChargeStationId) -> Result<usize> {
        let Ok(identifier) = ConnectorId::new(identifier) else {
            tracing::debug!(
                "Connector {} on '{}' cannot exist, nothing to delete",
                identifier,
                charge_station_id
            );
            return Ok(0);
        };

        let mut session = self.store.begin();
        let Some((_, _guard)) = self
            .locks
            .lock_station_owner(&session, charge_station_id)
            .await?
        else {
            return Ok(0);
        };

        if session
            .get_connector(identifier, charge_station_id)
            .await?
            .is_none()
        {
            tracing::debug!(
                "Connector {} on '{}' already absent",
                identifier,
                charge_station_id
            );
            return Ok(0);
        }

        session.delete_connector(identifier, charge_station_id).await?;
        let affected = session.commit().await?;
        tracing::info!("Removed connector {} on '{}'", identifier, charge_station_id);
        Ok(affected)
    }
}
