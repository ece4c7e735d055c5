//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批图片的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批处理驱动
//! - 管理一次运行的生命周期（初始化、运行、收尾）
//! - 持有完成记录（CompletionLedger）和结果文件（ResultWriter）
//! - 决定平铺扫描还是逐个子目录扫描
//! - 输出全局统计信息
//!
//! ### `directory_processor` - 单个目录处理器
//! - 遍历单个目录扫描出的图片（Vec<WorkItem>）
//! - 逐张调用 ItemFlow，一张处理完再开始下一张
//! - 输出单个目录的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个图片根目录)
//!     ↓
//! directory_processor (处理 Vec<WorkItem>)
//!     ↓
//! workflow::ItemFlow (处理单张图片)
//!     ↓
//! services (能力层：enumerator / ledger / retry / result_writer)
//!     ↓
//! clients (远程推理服务)
//! ```
//!
//! 全程单线程顺序执行，唯一的等待点是重试退避和远程调用本身。

pub mod batch_processor;
pub mod directory_processor;

pub use batch_processor::{App, ProcessingStats};
pub use directory_processor::process_directory;
