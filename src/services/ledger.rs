//! 完成记录 - 业务能力层
//!
//! 已写入结果文件的图片文件名集合。结果文件才是唯一的事实来源：
//! 启动时从结果文件重建，运行中只在持久写入成功之后增加，从不减少，也不单独落盘。

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::error::ConfigError;
use crate::models::ResultRecord;

/// 完成记录
#[derive(Debug, Default, Clone)]
pub struct CompletionLedger {
    written: HashSet<String>,
}

impl CompletionLedger {
    /// 从结果文件加载已完成的文件名；文件不存在时返回空集合
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("📄 开始新的结果文件: {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::StoreUnavailable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let ledger = Self::from_store_contents(&String::from_utf8_lossy(&bytes));
        info!("📋 检测到 {} 条已有结果", ledger.len());
        Ok(ledger)
    }

    /// 按行解析结果文件内容
    pub fn from_store_contents(contents: &str) -> Self {
        let written = contents
            .lines()
            .filter_map(ResultRecord::parse_key)
            .map(str::to_string)
            .collect();
        Self { written }
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.written.contains(filename)
    }

    /// 标记为已完成；只能在结果行持久写入之后调用
    pub(crate) fn mark(&mut self, filename: &str) {
        self.written.insert(filename.to_string());
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}
