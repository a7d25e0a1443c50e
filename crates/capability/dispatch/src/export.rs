//! 导出文件下游
//!
//! 每行 `"<通道>: <值保留两位小数>"`，每周期整体覆盖。先写同目录临时文件再重命名，
//! 读者不会看到写了一半的文件。

use crate::{ReadingSink, SinkError, SinkReceipt};
use async_trait::async_trait;
use domain::{ReadingSet, ReadingValue};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 无数据读数在导出文件中的写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoDataPolicy {
    /// 不写该通道
    #[default]
    Skip,
    /// 写为 `<通道>: null`
    Null,
}

/// 渲染导出文件内容，返回 (内容, 统计)。
pub fn render_export(set: &ReadingSet, policy: NoDataPolicy) -> (String, SinkReceipt) {
    let mut content = String::new();
    let mut receipt = SinkReceipt::default();
    for reading in set.readings() {
        match (reading.value, policy) {
            (ReadingValue::Value(value), _) => {
                let _ = writeln!(content, "{}: {:.2}", reading.channel, value);
                receipt.written += 1;
            }
            (ReadingValue::NoData(_), NoDataPolicy::Null) => {
                let _ = writeln!(content, "{}: null", reading.channel);
                receipt.written += 1;
            }
            (ReadingValue::NoData(_), NoDataPolicy::Skip) => {
                receipt.skipped += 1;
            }
        }
    }
    (content, receipt)
}

/// 共享文件导出下游。
pub struct FileExportSink {
    path: PathBuf,
    policy: NoDataPolicy,
}

impl FileExportSink {
    pub fn new(path: impl Into<PathBuf>, policy: NoDataPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ReadingSink for FileExportSink {
    fn name(&self) -> &'static str {
        "export"
    }

    async fn deliver(&self, set: &ReadingSet) -> Result<SinkReceipt, SinkError> {
        let (content, receipt) = render_export(set, self.policy);
        let staging = self.staging_path();
        tokio::fs::write(&staging, content.as_bytes())
            .await
            .map_err(|err| SinkError::Export(format!("{}: {}", staging.display(), err)))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| SinkError::Export(format!("{}: {}", self.path.display(), err)))?;
        debug!(
            target: "daq.dispatch",
            path = %self.path.display(),
            written = receipt.written,
            skipped = receipt.skipped,
            "export_file_written"
        );
        Ok(receipt)
    }
}
