use std::sync::Arc;
use std::time::Duration;

use smart_charging::core::connector::ConnectorCoordinator;
use smart_charging::core::GroupLocks;
use smart_charging::domain::commands::{SaveChargeStation, SaveConnector, SaveGroup};
use smart_charging::{ChargeStationId, ChargingEngine, GroupId, InMemoryStore, SmartChargingError};
use tokio_test::assert_ok;

async fn engine_with_stations(
    capacity: f64,
    stations: usize,
) -> (Arc<ChargingEngine<InMemoryStore>>, GroupId, Vec<ChargeStationId>) {
    let engine = ChargingEngine::with_defaults(InMemoryStore::new());
    let group = GroupId::new_v4();
    assert_ok!(
        engine
            .groups()
            .save(SaveGroup::create(group, "Depot", capacity))
            .await
    );

    let mut ids = Vec::with_capacity(stations);
    for i in 0..stations {
        let station = ChargeStationId::new_v4();
        assert_ok!(
            engine
                .charge_stations()
                .save(SaveChargeStation::create(station, group, format!("CS-{i}")))
                .await
        );
        ids.push(station);
    }
    (Arc::new(engine), group, ids)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_connector_saves_never_exceed_capacity() {
    // 8 stations x 5 connectors x 3 A = 120 A requested against 50 A.
    let (engine, group, stations) = engine_with_stations(50.0, 8).await;

    let mut handles = Vec::new();
    for station in stations {
        for id in 1..=5 {
            let task_engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                task_engine
                    .connectors()
                    .save(SaveConnector::create(id, station, 3.0))
                    .await
                    .is_ok()
            }));
        }
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    let total = engine.group_total_amps(group).await.unwrap();
    assert_eq!(admitted, 16);
    assert_eq!(total, 48.0);
    assert_eq!(engine.store().connector_count(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_capacity_shrink_and_connector_growth_stay_consistent() {
    let (engine, group, stations) = engine_with_stations(40.0, 4).await;

    let mut connector_tasks = Vec::new();
    let mut shrink_task = None;
    for (n, station) in stations.into_iter().enumerate() {
        let task_engine = Arc::clone(&engine);
        connector_tasks.push(tokio::spawn(async move {
            task_engine
                .connectors()
                .save(SaveConnector::create(1, station, 10.0))
                .await
        }));
        if n == 1 {
            let shrink_engine = Arc::clone(&engine);
            shrink_task = Some(tokio::spawn(async move {
                shrink_engine
                    .groups()
                    .save(SaveGroup::upsert(group, "Depot", 25.0))
                    .await
            }));
        }
    }
    for task in connector_tasks {
        let _ = task.await.unwrap();
    }
    let shrink = shrink_task.unwrap().await.unwrap();

    let view = engine.group(group).await.unwrap().unwrap();
    assert!(view.total_amps() <= view.group.capacity);
    match shrink {
        Ok(_) => {
            assert_eq!(view.group.capacity, 25.0);
            assert!(view.total_amps() <= 20.0);
        }
        Err(SmartChargingError::CapacityDecreaseRejected { current_total, .. }) => {
            // Rejected only when more than 25 A was already committed.
            assert!(current_total > 25.0);
            assert_eq!(view.group.capacity, 40.0);
        }
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_save_commits_nothing() {
    let store = InMemoryStore::new();
    let engine = ChargingEngine::with_defaults(store.clone());
    let group = GroupId::new_v4();
    let station = ChargeStationId::new_v4();
    assert_ok!(
        engine
            .groups()
            .save(SaveGroup::create(group, "Depot", 10.0))
            .await
    );
    assert_ok!(
        engine
            .charge_stations()
            .save(SaveChargeStation::create(station, group, "North"))
            .await
    );

    // A second coordinator over the same store, sharing a registry the test
    // can hold so the save is parked on the Group lock when it is dropped.
    let locks = GroupLocks::new();
    let connectors = ConnectorCoordinator::new(Arc::new(store.clone()), locks.clone());
    let guard = locks.lock(group).await;

    let attempt = tokio::time::timeout(
        Duration::from_millis(50),
        connectors.save(SaveConnector::create(1, station, 5.0)),
    )
    .await;
    assert!(attempt.is_err());
    drop(guard);

    assert_eq!(store.connector_count(), 0);
    assert_eq!(engine.group_total_amps(group).await.unwrap(), 0.0);

    // The lock is released: the same save now goes through.
    assert_ok!(connectors.save(SaveConnector::create(1, station, 5.0)).await);
    assert_eq!(store.connector_count(), 1);
}
