use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::model::{ChargeStationId, ChargeStationView, GroupId};
use crate::domain::ports::StoreSession;
use crate::utils::error::Result;

/// Per-Group exclusive sections. Every admission decision for a Group, and
/// the commit that follows it, runs while holding that Group's guard.
#[derive(Debug, Clone, Default)]
pub struct GroupLocks {
    locks: Arc<DashMap<GroupId, Arc<Mutex<()>>>>,
}

/// Guards held for the duration of one mutation, released on drop.
///
/// Releasing also drops the registry entry of every Group nobody else is
/// waiting on, so ids that were only locked once leave nothing behind.
#[derive(Debug)]
pub struct GroupGuard {
    registry: Arc<DashMap<GroupId, Arc<Mutex<()>>>>,
    groups: Vec<GroupId>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl GroupGuard {
    pub fn covers(&self, group_id: GroupId) -> bool {
        self.groups.contains(&group_id)
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.guards.clear();
        for group_id in &self.groups {
            // Only the map holds the mutex: no guard, no waiter.
            self.registry
                .remove_if(group_id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, group_id: GroupId) -> Arc<Mutex<()>> {
        // The map entry guard must not outlive this call.
        Arc::clone(self.locks.entry(group_id).or_default().value())
    }

    pub async fn lock(&self, group_id: GroupId) -> GroupGuard {
        self.lock_all(&[group_id]).await
    }

    /// Locks several Groups in ascending identifier order so that two
    /// callers asking for the same pair cannot deadlock.
    pub async fn lock_all(&self, group_ids: &[GroupId]) -> GroupGuard {
        let mut groups = group_ids.to_vec();
        groups.sort();
        groups.dedup();

        let mut guards = Vec::with_capacity(groups.len());
        for group_id in &groups {
            guards.push(self.handle(*group_id).lock_owned().await);
        }

        GroupGuard {
            registry: Arc::clone(&self.locks),
            groups,
            guards,
        }
    }

    /// Locks the Group that currently owns a ChargeStation and returns the
    /// station as read under that lock. `None` when the station is absent.
    ///
    /// The owner is re-read after locking: if the station was moved to another
    /// Group in between, the guard is released and the new owner is locked.
    pub async fn lock_station_owner<S: StoreSession>(
        &self,
        session: &S,
        charge_station_id: ChargeStationId,
    ) -> Result<Option<(ChargeStationView, GroupGuard)>> {
        let Some(mut view) = session.get_charge_station(charge_station_id).await? else {
            return Ok(None);
        };
        loop {
            let owner = view.charge_station.group_identifier;
            let guard = self.lock(owner).await;
            match session.get_charge_station(charge_station_id).await? {
                None => return Ok(None),
                Some(current) if current.charge_station.group_identifier == owner => {
                    return Ok(Some((current, guard)));
                }
                Some(moved) => {
                    tracing::debug!(
                        "Charge station {} moved from group {} while locking, retrying",
                        charge_station_id,
                        owner
                    );
                    view = moved;
                }
            }
        }
    }

    /// Number of Groups with a live registry entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
