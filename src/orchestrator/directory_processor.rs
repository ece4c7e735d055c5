//! 单个目录处理器 - 编排层
//!
//! 遍历一个目录中扫描出的图片，逐张交给 [`ItemFlow`]，并统计结果。

use std::path::Path;

use tracing::info;

use crate::clients::InferenceClient;
use crate::error::AppResult;
use crate::orchestrator::ProcessingStats;
use crate::services::{CompletionLedger, ResultWriter, WorkEnumerator};
use crate::workflow::{ItemFlow, ProcessResult};

/// 处理单个目录
///
/// # 参数
/// - `flow`: 单张图片处理流程
/// - `enumerator`: 图片扫描器
/// - `dir`: 要扫描的目录（平铺，不递归）
/// - `ledger` / `writer`: 整个运行共享的完成记录与结果文件
///
/// # 返回
/// 返回本目录的统计；只有扫描失败或结果文件写入失败会返回错误
pub async fn process_directory<C: InferenceClient>(
    flow: &ItemFlow<C>,
    enumerator: &WorkEnumerator,
    dir: &Path,
    ledger: &mut CompletionLedger,
    writer: &mut ResultWriter,
) -> AppResult<ProcessingStats> {
    let items = enumerator.scan(dir).await?;
    info!("📁 {} 中找到 {} 张匹配的图片", dir.display(), items.len());

    let mut stats = ProcessingStats::default();

    for item in &items {
        match flow.run(item, ledger, writer).await? {
            ProcessResult::Written => stats.written += 1,
            ProcessResult::Skipped => stats.skipped += 1,
            ProcessResult::Exhausted => stats.exhausted += 1,
            ProcessResult::Unreadable => stats.unreadable += 1,
        }
    }

    Ok(stats)
}
