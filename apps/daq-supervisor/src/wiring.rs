//! 组件装配模块
//!
//! 把启动时读到的 [`AppConfig`] 映射为各能力模块自己的配置，
//! 并组装出可以直接 `spawn` 的 [`Supervisor`]。

use daq_acquire::{ChannelAcquirer, ChannelSource};
use daq_config::{AppConfig, ExportNoData, QueueOverflow};
use daq_dispatch::{
    DispatchFanout, FileExportSink, NoDataPolicy, NoopSink, ReadingSink, RegisterSink,
    RegisterSinkConfig,
};
use daq_pipeline::{CycleOrchestrator, OverflowPolicy, Recorder, Supervisor, SupervisorSettings};
use daq_protocol::{ModbusTcpClient, ModbusTcpConfig};
use daq_storage::ReadingStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 监管参数（节拍、队列、宽限期）。
pub fn supervisor_settings(config: &AppConfig) -> SupervisorSettings {
    let overflow = match config.queue_overflow {
        QueueOverflow::DropOldest => OverflowPolicy::DropOldest,
        QueueOverflow::Block => OverflowPolicy::Block {
            timeout: Duration::from_millis(config.queue_push_timeout_ms),
        },
    };
    SupervisorSettings {
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        queue_capacity: config.queue_capacity,
        overflow,
        shutdown_grace: Duration::from_millis(config.shutdown_grace_ms),
    }
}

/// 导出下游：未启用时为空下游。
pub fn export_sink(config: &AppConfig) -> Arc<dyn ReadingSink> {
    if !config.export_enabled {
        info!("export sink: disabled (DAQ_EXPORT_ENABLED=off)");
        return Arc::new(NoopSink);
    }
    let policy = match config.export_no_data {
        ExportNoData::Skip => NoDataPolicy::Skip,
        ExportNoData::Null => NoDataPolicy::Null,
    };
    info!("export sink: file {} no_data={:?}", config.export_path, policy);
    Arc::new(FileExportSink::new(config.export_path.clone(), policy))
}

/// 远端寄存器下游：未启用时为空下游。
pub fn remote_sink(config: &AppConfig) -> Arc<dyn ReadingSink> {
    if !config.remote_enabled {
        info!("remote sink: disabled (DAQ_REMOTE_ENABLED=off)");
        return Arc::new(NoopSink);
    }
    let client = ModbusTcpClient::new(ModbusTcpConfig {
        host: config.remote_host.clone(),
        port: config.remote_port,
        unit_id: config.remote_unit_id,
        connect_timeout_ms: config.remote_connect_timeout_ms,
    });
    info!(
        "remote sink: modbus {}:{} unit={} base={} scale={}",
        config.remote_host,
        config.remote_port,
        config.remote_unit_id,
        config.remote_base_address,
        config.remote_scale_factor
    );
    Arc::new(RegisterSink::new(
        Arc::new(client),
        RegisterSinkConfig {
            base_address: config.remote_base_address,
            scale_factor: config.remote_scale_factor,
            format: config.remote_register_format,
        },
    ))
}

/// 组装流水线监管者。
pub fn build_supervisor(
    config: &AppConfig,
    source: Arc<dyn ChannelSource>,
    store: Arc<dyn ReadingStore>,
) -> Supervisor {
    let orchestrator = CycleOrchestrator::new(config.channels.clone(), ChannelAcquirer::new(source));
    let recorder = Recorder::new(store);
    let fanout = Arc::new(DispatchFanout::new(
        export_sink(config),
        remote_sink(config),
        Duration::from_millis(config.sink_timeout_ms),
    ));
    Supervisor::new(orchestrator, recorder, fanout, supervisor_settings(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daq_acquire::SimulatedChannelSource;
    use daq_storage::InMemoryReadingStore;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned()).expect("config")
    }

    #[test]
    fn block_policy_carries_push_timeout() {
        let settings = supervisor_settings(&config(&[
            ("DAQ_QUEUE_OVERFLOW", "block"),
            ("DAQ_QUEUE_PUSH_TIMEOUT_MS", "250"),
            ("DAQ_QUEUE_CAPACITY", "4"),
        ]));
        assert_eq!(
            settings.overflow,
            OverflowPolicy::Block {
                timeout: Duration::from_millis(250)
            }
        );
        assert_eq!(settings.queue_capacity, 4);
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn disabled_sinks_become_noop() {
        let config = config(&[("DAQ_EXPORT_ENABLED", "off"), ("DAQ_REMOTE_ENABLED", "0")]);
        assert!(!export_sink(&config).enabled());
        assert!(!remote_sink(&config).enabled());
    }

    #[test]
    fn enabled_sinks_are_named() {
        let config = config(&[]);
        assert_eq!(export_sink(&config).name(), "export");
        assert_eq!(remote_sink(&config).name(), "remote");
    }

    #[tokio::test]
    async fn simulated_pipeline_exports_every_channel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let export_path = dir.path().join("sensor_data.txt");
        let export_path_str = export_path.to_string_lossy().to_string();
        let config = config(&[
            ("DAQ_POLL_INTERVAL_MS", "50"),
            ("DAQ_REMOTE_ENABLED", "off"),
            ("DAQ_EXPORT_PATH", export_path_str.as_str()),
            (
                "DAQ_CHANNELS",
                r#"[{"name":"temperature","address":"Dev1/ai0","range":{"min":-50,"max":150},"samples_per_read":100}]"#,
            ),
        ]);
        let store = Arc::new(InMemoryReadingStore::new());
        let handle = build_supervisor(
            &config,
            Arc::new(SimulatedChannelSource::new()),
            store.clone(),
        )
        .spawn();

        tokio::time::timeout(Duration::from_secs(5), async {
            while store.is_empty() || !export_path.exists() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("first cycle exported");
        handle.shutdown().await;

        let content = std::fs::read_to_string(&export_path).expect("export file");
        assert!(content.starts_with("temperature: "));
    }
}
