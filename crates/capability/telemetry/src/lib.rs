//! 日志初始化、周期 ID 生成与基础指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_completed: u64,
    pub cycles_cancelled: u64,
    pub channel_no_data: u64,
    pub channel_errors: u64,
    pub rows_persisted: u64,
    pub persist_failures: u64,
    pub export_success: u64,
    pub export_failures: u64,
    pub remote_success: u64,
    pub remote_failures: u64,
    pub registers_written: u64,
    pub queue_dropped: u64,
    pub sets_discarded: u64,
}

/// 流水线指标（进程级计数器）。
pub struct PipelineMetrics {
    cycles_completed: AtomicU64,
    cycles_cancelled: AtomicU64,
    channel_no_data: AtomicU64,
    channel_errors: AtomicU64,
    rows_persisted: AtomicU64,
    persist_failures: AtomicU64,
    export_success: AtomicU64,
    export_failures: AtomicU64,
    remote_success: AtomicU64,
    remote_failures: AtomicU64,
    registers_written: AtomicU64,
    queue_dropped: AtomicU64,
    sets_discarded: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            cycles_completed: AtomicU64::new(0),
            cycles_cancelled: AtomicU64::new(0),
            channel_no_data: AtomicU64::new(0),
            channel_errors: AtomicU64::new(0),
            rows_persisted: AtomicU64::new(0),
            persist_failures: AtomicU64::new(0),
            export_success: AtomicU64::new(0),
            export_failures: AtomicU64::new(0),
            remote_success: AtomicU64::new(0),
            remote_failures: AtomicU64::new(0),
            registers_written: AtomicU64::new(0),
            queue_dropped: AtomicU64::new(0),
            sets_discarded: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_cancelled: self.cycles_cancelled.load(Ordering::Relaxed),
            channel_no_data: self.channel_no_data.load(Ordering::Relaxed),
            channel_errors: self.channel_errors.load(Ordering::Relaxed),
            rows_persisted: self.rows_persisted.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            export_success: self.export_success.load(Ordering::Relaxed),
            export_failures: self.export_failures.load(Ordering::Relaxed),
            remote_success: self.remote_success.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            registers_written: self.registers_written.load(Ordering::Relaxed),
            queue_dropped: self.queue_dropped.load(Ordering::Relaxed),
            sets_discarded: self.sets_discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static PipelineMetrics {
    METRICS.get_or_init(PipelineMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的周期 ID。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录完成的采集周期。
pub fn record_cycle_completed() {
    metrics().cycles_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录因关停而丢弃的采集周期。
pub fn record_cycle_cancelled() {
    metrics().cycles_cancelled.fetch_add(1, Ordering::Relaxed);
}

/// 记录无数据读数。
pub fn record_channel_no_data() {
    metrics().channel_no_data.fetch_add(1, Ordering::Relaxed);
}

/// 记录通道错误（打开或读取失败）。
pub fn record_channel_error() {
    metrics().channel_errors.fetch_add(1, Ordering::Relaxed);
}

/// 记录持久化行数。
pub fn record_rows_persisted(rows: u64) {
    metrics().rows_persisted.fetch_add(rows, Ordering::Relaxed);
}

pub fn record_persist_failure() {
    metrics().persist_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_export_success() {
    metrics().export_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_export_failure() {
    metrics().export_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_remote_success() {
    metrics().remote_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_remote_failure() {
    metrics().remote_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入的寄存器数量。
pub fn record_registers_written(count: u64) {
    metrics()
        .registers_written
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录交接队列溢出丢弃次数。
pub fn record_queue_dropped() {
    metrics().queue_dropped.fetch_add(1, Ordering::Relaxed);
}

/// 记录关停时未能处理而丢弃的读数集合。
pub fn record_sets_discarded(count: u64) {
    metrics().sets_discarded.fetch_add(count, Ordering::Relaxed);
}

/// 输出指标快照汇总日志。
pub fn log_metrics_summary() {
    let snapshot = metrics().snapshot();
    tracing::info!(
        target: "daq.telemetry",
        cycles_completed = snapshot.cycles_completed,
        cycles_cancelled = snapshot.cycles_cancelled,
        channel_no_data = snapshot.channel_no_data,
        channel_errors = snapshot.channel_errors,
        rows_persisted = snapshot.rows_persisted,
        persist_failures = snapshot.persist_failures,
        export_success = snapshot.export_success,
        export_failures = snapshot.export_failures,
        remote_success = snapshot.remote_success,
        remote_failures = snapshot.remote_failures,
        registers_written = snapshot.registers_written,
        queue_dropped = snapshot.queue_dropped,
        sets_discarded = snapshot.sets_discarded,
        "metrics_summary"
    );
}
