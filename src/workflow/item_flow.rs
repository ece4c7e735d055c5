//! 单张图片处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 已在完成记录中 → 跳过
//! 2. 读取图片
//! 3. 提示词 + 图片 → 推理服务（带重试）
//! 4. 成功 → 写入结果文件并标记完成；耗尽 → 记录日志，交给下一张

use tracing::{error, info, warn};

use crate::clients::InferenceClient;
use crate::error::AppResult;
use crate::models::{ImagePayload, Prompt, ResultRecord, WorkItem};
use crate::services::{CompletionLedger, ResultWriter, RetryPolicy};

/// 单张图片的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已写入结果文件
    Written,
    /// 之前已完成，跳过
    Skipped,
    /// 重试耗尽，本次运行放弃
    Exhausted,
    /// 图片无法读取，本次运行放弃
    Unreadable,
}

/// 单张图片处理流程
///
/// - 持有推理客户端、提示词和重试策略
/// - 不持有完成记录和结果文件，由编排层按引用传入
pub struct ItemFlow<C> {
    client: C,
    prompt: Prompt,
    retry: RetryPolicy,
}

impl<C: InferenceClient> ItemFlow<C> {
    pub fn new(client: C, prompt: Prompt, retry: RetryPolicy) -> Self {
        Self {
            client,
            prompt,
            retry,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 处理一张图片
    ///
    /// 只有结果文件写入失败会返回错误；远程失败和读图失败都被吸收为 [`ProcessResult`]。
    pub async fn run(
        &self,
        item: &WorkItem,
        ledger: &mut CompletionLedger,
        writer: &mut ResultWriter,
    ) -> AppResult<ProcessResult> {
        if ledger.contains(&item.filename) {
            info!("⏭️ 已写入，跳过 {}", item.filename);
            return Ok(ProcessResult::Skipped);
        }

        let path = item.path();
        let image = match ImagePayload::read(&path).await {
            Ok(image) => image,
            Err(e) => {
                error!("❌ 无法读取图片 {}: {}", path.display(), e);
                return Ok(ProcessResult::Unreadable);
            }
        };

        let outcome = self
            .retry
            .attempt(&item.filename, || self.client.submit(&self.prompt, &image))
            .await;

        match outcome {
            Ok(text) => {
                writer.write(&ResultRecord::new(item.filename.as_str(), text), ledger)?;
                Ok(ProcessResult::Written)
            }
            Err(exhausted) => {
                warn!("⚠️ 放弃 {}: {}", path.display(), exhausted);
                Ok(ProcessResult::Exhausted)
            }
        }
    }
}
