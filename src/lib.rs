//! # Image Prompt Batch
//!
//! 把一个目录（或其子目录）里按序号命名的图片逐张连同同一段提示词发送给
//! 多模态推理服务，每张图片的响应追加为结果文件中的一行。中断后重新运行会
//! 跳过结果文件中已有的图片。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程推理服务，只暴露能力
//! - `InferenceClient` - 推理接口，`OpenAiVisionClient` 为默认实现
//! - `ModelCatalog` - 列出可用模型（诊断用）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `WorkEnumerator` - 扫描图片
//! - `CompletionLedger` - 已完成记录
//! - `RetryPolicy` - 线性退避重试
//! - `ResultWriter` - 追加并落盘结果行
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张图片"的完整处理流程
//! - `ItemFlow` - 跳过 → 读图 → 推理（重试）→ 写入
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理驱动，持有完成记录和结果文件
//! - `orchestrator/directory_processor` - 单个目录处理器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{InferenceClient, OpenAiVisionClient};
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, RemoteError, RetryExhausted};
pub use models::{ImagePayload, Prompt, ResultRecord, WorkItem};
pub use orchestrator::{App, ProcessingStats};
pub use services::{CompletionLedger, ResultWriter, RetryPolicy, ScanPlan, WorkEnumerator};
pub use workflow::{ItemFlow, ProcessResult};
