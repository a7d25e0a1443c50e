use daq_acquire::{AcquireError, ChannelAcquirer, ChannelSource, SimulatedChannelSource};
use domain::{ChannelConfig, NoDataReason, ReadingValue, ValidRange};
use std::sync::Arc;
use std::time::Duration;

fn pressure() -> ChannelConfig {
    let mut config = ChannelConfig::new("pressure", "Dev1/ai1", ValidRange::inclusive(0.0, 100.0));
    config.samples_per_read = 200;
    config
}

#[tokio::test]
async fn simulated_batch_contains_spikes_and_filters_to_range() {
    let source = SimulatedChannelSource::new();
    let channel = pressure();
    let handle = source.open(&channel).await.expect("open");
    let batch = source
        .read(&handle, channel.samples_per_read, Duration::from_secs(1))
        .await
        .expect("read");
    source.close(handle).await;

    assert_eq!(batch.len(), 200);
    assert!(batch.iter().any(|sample| !channel.range.contains(*sample)));
    match daq_filter::filter(&batch, &channel.range) {
        ReadingValue::Value(v) => assert!((40.0..=60.0).contains(&v), "mean {v}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn address_cannot_be_claimed_twice() {
    let source = SimulatedChannelSource::new();
    let channel = pressure();
    let first = source.open(&channel).await.expect("open");
    let err = source.open(&channel).await.expect_err("claimed");
    assert!(matches!(err, AcquireError::Configuration(_)));

    source.close(first).await;
    assert_eq!(source.claimed(), 0);
    let again = source.open(&channel).await.expect("reopen");
    source.close(again).await;
}

#[tokio::test]
async fn empty_address_is_configuration_error() {
    let acquirer = ChannelAcquirer::new(Arc::new(SimulatedChannelSource::new()));
    let mut channel = pressure();
    channel.address = String::new();
    let reading = acquirer.acquire(&channel).await;
    assert_eq!(reading.value, ReadingValue::NoData(NoDataReason::Configuration));
}

#[tokio::test]
async fn acquirer_releases_claims_every_cycle() {
    let source = Arc::new(SimulatedChannelSource::new());
    let acquirer = ChannelAcquirer::new(source.clone());
    let channel = pressure();
    for _ in 0..3 {
        let reading = acquirer.acquire(&channel).await;
        assert!(!reading.value.is_no_data());
        assert_eq!(source.claimed(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn paced_read_exceeding_timeout_fails() {
    let source = Arc::new(SimulatedChannelSource::paced());
    let acquirer = ChannelAcquirer::new(source.clone());
    let mut channel = pressure();
    channel.samples_per_read = 1000;
    channel.sample_rate_hz = 100;
    channel.read_timeout_ms = 2000;
    let reading = acquirer.acquire(&channel).await;
    assert_eq!(reading.value, ReadingValue::NoData(NoDataReason::Acquisition));
    assert_eq!(source.claimed(), 0);
}

#[tokio::test(start_paused = true)]
async fn abandoned_cycle_releases_claim_for_next_cycle() {
    let source = Arc::new(SimulatedChannelSource::paced());
    let acquirer = ChannelAcquirer::new(source.clone());
    let mut slow = pressure();
    slow.samples_per_read = 1000;
    slow.sample_rate_hz = 100;
    slow.read_timeout_ms = 20_000;

    tokio::time::timeout(Duration::from_millis(50), acquirer.acquire(&slow))
        .await
        .expect_err("cycle abandoned mid-read");
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(source.claimed(), 0);

    let reading = acquirer.acquire(&pressure()).await;
    assert!(!reading.value.is_no_data());
}
