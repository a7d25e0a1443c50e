//! 采集守护进程：周期采集 → 落库 → 导出文件 / 远端寄存器。

mod wiring;

use daq_acquire::SimulatedChannelSource;
use daq_config::AppConfig;
use daq_storage::SqliteReadingStore;
use daq_telemetry::{init_tracing, log_metrics_summary};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    info!(
        channels = config.channels.len(),
        store = %config.store_url,
        "daq supervisor starting"
    );

    // SQLite 读数存储（建表随连接完成）
    let store = Arc::new(SqliteReadingStore::connect(&config.store_url).await?);
    // 未接入厂商驱动时使用模拟通道源
    let source = Arc::new(SimulatedChannelSource::paced());

    let handle = wiring::build_supervisor(&config, source, store).spawn();

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl_c listener failed");
    }
    handle.shutdown().await;
    log_metrics_summary();
    Ok(())
}
