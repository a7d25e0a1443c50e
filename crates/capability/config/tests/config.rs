use daq_config::{AppConfig, ConfigError, ExportNoData, QueueOverflow, RegisterFormat};
use std::collections::HashMap;
use std::io::Write;

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_match_legacy_deployment() {
    let config = load(&[]).expect("config");
    assert_eq!(config.channels.len(), 8);
    assert_eq!(config.channels[0].name, "temperature");
    assert_eq!(config.channels[0].address, "Dev1/ai0");
    assert_eq!(config.poll_interval_ms, 10_000);
    assert_eq!(config.queue_capacity, 1);
    assert_eq!(config.queue_overflow, QueueOverflow::DropOldest);
    assert_eq!(config.export_no_data, ExportNoData::Skip);
    assert_eq!(config.remote_host, "192.168.1.100");
    assert_eq!(config.remote_port, 502);
    assert_eq!(config.remote_scale_factor, 100.0);
    assert_eq!(config.remote_register_format, RegisterFormat::Int16);
}

#[test]
fn inline_channels_override_defaults() {
    let config = load(&[
        (
            "DAQ_CHANNELS",
            r#"[{"name": "a", "address": "Dev2/ai0", "range": {"min": 0, "max": 1000, "min_inclusive": false, "max_inclusive": false}, "samples_per_read": 10}]"#,
        ),
        ("DAQ_QUEUE_OVERFLOW", "block"),
        ("DAQ_QUEUE_CAPACITY", "4"),
        ("DAQ_EXPORT_NO_DATA", "null"),
    ])
    .expect("config");
    assert_eq!(config.channels.len(), 1);
    assert_eq!(config.channels[0].samples_per_read, 10);
    assert!(!config.channels[0].range.min_inclusive);
    assert_eq!(config.queue_overflow, QueueOverflow::Block);
    assert_eq!(config.queue_capacity, 4);
    assert_eq!(config.export_no_data, ExportNoData::Null);
}

#[test]
fn channels_file_is_read() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"[{{"name": "x", "address": "Dev1/ai0", "range": {{"min": -1, "max": 1}}}},
            {{"name": "y", "address": "Dev1/ai1", "range": {{"min": 0, "max": 5}}}}]"#
    )
    .expect("write");
    let path = file.path().to_string_lossy().to_string();
    let config = load(&[("DAQ_CHANNELS_FILE", path.as_str())]).expect("config");
    assert_eq!(config.channels.len(), 2);
    assert_eq!(config.channels[1].name, "y");
}

#[test]
fn duplicate_channel_names_are_rejected() {
    let err = load(&[(
        "DAQ_CHANNELS",
        r#"[{"name": "a", "address": "Dev1/ai0", "range": {"min": 0, "max": 1}},
            {"name": "a", "address": "Dev1/ai1", "range": {"min": 0, "max": 1}}]"#,
    )])
    .expect_err("duplicate");
    assert!(err.to_string().contains("duplicate channel name"));
}

#[test]
fn zero_queue_capacity_is_rejected() {
    let err = load(&[("DAQ_QUEUE_CAPACITY", "0")]).expect_err("capacity");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "DAQ_QUEUE_CAPACITY"));
}

#[test]
fn unknown_overflow_policy_is_rejected() {
    let err = load(&[("DAQ_QUEUE_OVERFLOW", "drop_newest")]).expect_err("policy");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "DAQ_QUEUE_OVERFLOW"));
}

#[test]
fn non_numeric_port_is_rejected() {
    let err = load(&[("DAQ_REMOTE_PORT", "modbus")]).expect_err("port");
    assert_eq!(err.to_string(), "invalid value for DAQ_REMOTE_PORT: modbus");
}

#[test]
fn misspelled_flag_is_rejected() {
    let err = load(&[("DAQ_EXPORT_ENABLED", "ture")]).expect_err("flag");
    assert!(matches!(err, ConfigError::Invalid(key, value) if key == "DAQ_EXPORT_ENABLED" && value == "ture"));
}

#[test]
fn flag_spellings_are_accepted() {
    let config = load(&[("DAQ_EXPORT_ENABLED", "Off"), ("DAQ_REMOTE_ENABLED", "yes")])
        .expect("config");
    assert!(!config.export_enabled);
    assert!(config.remote_enabled);
}

#[test]
fn register_format_parses_to_protocol_encoding() {
    let config = load(&[("DAQ_REMOTE_REGISTER_FORMAT", "uint16")]).expect("config");
    assert_eq!(config.remote_register_format, daq_protocol::RegisterFormat::Uint16);
}

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("DAQ_POLL_INTERVAL_MS", "2500");
        std::env::set_var("DAQ_REMOTE_BASE_ADDRESS", "40");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.poll_interval_ms, 2500);
    assert_eq!(config.remote_base_address, 40);
}
