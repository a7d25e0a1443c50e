mod common;

use common::{CollectingSink, FixedSource, channels};
use daq_acquire::ChannelAcquirer;
use daq_dispatch::{DispatchFanout, NoopSink};
use daq_pipeline::{
    CycleOrchestrator, OverflowPolicy, Recorder, Supervisor, SupervisorSettings, SupervisorState,
};
use daq_storage::{InMemoryReadingStore, ReadingStore};
use std::sync::Arc;
use std::time::Duration;

struct Rig {
    source: Arc<FixedSource>,
    store: Arc<InMemoryReadingStore>,
    sink: Arc<CollectingSink>,
}

fn supervisor(rig: &Rig, settings: SupervisorSettings) -> Supervisor {
    let orchestrator = CycleOrchestrator::new(channels(2), ChannelAcquirer::new(rig.source.clone()));
    let recorder = Recorder::new(rig.store.clone());
    let fanout = Arc::new(DispatchFanout::new(
        rig.sink.clone(),
        Arc::new(NoopSink),
        Duration::from_secs(30),
    ));
    Supervisor::new(orchestrator, recorder, fanout, settings)
}

async fn wait_for(mut predicate: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !predicate() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition reached in time");
}

#[tokio::test]
async fn cycles_flow_through_recorder_and_sinks() {
    let rig = Rig {
        source: Arc::new(FixedSource::new(12.0)),
        store: Arc::new(InMemoryReadingStore::new()),
        sink: Arc::new(CollectingSink::default()),
    };
    let handle = supervisor(
        &rig,
        SupervisorSettings {
            poll_interval: Duration::from_millis(20),
            queue_capacity: 1,
            overflow: OverflowPolicy::DropOldest,
            shutdown_grace: Duration::from_secs(1),
        },
    )
    .spawn();

    let sink = rig.sink.clone();
    wait_for(move || sink.count() >= 3).await;

    let mut acquisition = handle.subscribe_acquisition();
    let mut dispatch = handle.subscribe_dispatch();
    handle.shutdown().await;

    assert_eq!(*acquisition.borrow_and_update(), SupervisorState::Shutdown);
    assert_eq!(*dispatch.borrow_and_update(), SupervisorState::Shutdown);
    rig.source.assert_balanced();

    let delivered = rig.sink.count() as u64;
    assert_eq!(rig.store.count_records().await.expect("count"), delivered * 2);
    for set in rig.sink.delivered.lock().unwrap().iter() {
        assert_eq!(set.len(), 2);
    }
}

#[tokio::test]
async fn shutdown_drains_queued_sets_within_grace() {
    let rig = Rig {
        source: Arc::new(FixedSource::new(5.0)),
        store: Arc::new(InMemoryReadingStore::new()),
        sink: Arc::new(CollectingSink::delayed(Duration::from_millis(40))),
    };
    let handle = supervisor(
        &rig,
        SupervisorSettings {
            poll_interval: Duration::from_millis(5),
            queue_capacity: 3,
            overflow: OverflowPolicy::DropOldest,
            shutdown_grace: Duration::from_secs(2),
        },
    )
    .spawn();
    let queue = handle.queue().clone();

    let source = rig.source.clone();
    wait_for(move || source.opened.lock().unwrap().len() >= 8).await;
    handle.shutdown().await;

    assert!(queue.is_empty().await);
    let delivered = rig.sink.count() as u64;
    assert!(delivered >= 2);
    assert_eq!(rig.store.count_records().await.expect("count"), delivered * 2);
    rig.source.assert_balanced();
}

#[tokio::test]
async fn shutdown_gives_up_after_grace_period() {
    let rig = Rig {
        source: Arc::new(FixedSource::new(5.0)),
        store: Arc::new(InMemoryReadingStore::new()),
        sink: Arc::new(CollectingSink::delayed(Duration::from_secs(60))),
    };
    let handle = supervisor(
        &rig,
        SupervisorSettings {
            poll_interval: Duration::from_millis(5),
            queue_capacity: 2,
            overflow: OverflowPolicy::DropOldest,
            shutdown_grace: Duration::from_millis(100),
        },
    )
    .spawn();

    let mut dispatch = handle.subscribe_dispatch();
    tokio::time::timeout(Duration::from_secs(5), async {
        while *dispatch.borrow_and_update() != SupervisorState::Draining {
            if dispatch.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .expect("dispatch started");

    let queue = handle.queue().clone();
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown bounded by grace");

    assert_eq!(rig.sink.count(), 0);
    assert!(queue.is_empty().await);
    rig.source.assert_balanced();
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_channel() {
    let rig = Rig {
        source: Arc::new(FixedSource::new(5.0).with_read_delay(Duration::from_millis(150))),
        store: Arc::new(InMemoryReadingStore::new()),
        sink: Arc::new(CollectingSink::default()),
    };
    let handle = supervisor(&rig, SupervisorSettings::default()).spawn();

    let source = rig.source.clone();
    wait_for(move || !source.opened.lock().unwrap().is_empty()).await;
    handle.shutdown().await;

    assert_eq!(rig.source.opened.lock().unwrap().len(), 1);
    rig.source.assert_balanced();
    assert_eq!(rig.sink.count(), 0);
}
