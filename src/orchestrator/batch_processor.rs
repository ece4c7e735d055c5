//! 批处理驱动 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行的完整生命周期。
//!
//! ## 运行阶段
//!
//! 1. **INIT**：校验配置、加载提示词、从结果文件重建完成记录、以追加模式打开结果文件
//! 2. **ENUMERATE_ROOT**：判断根目录下是否有子目录
//! 3. **FLAT_SCAN / PER_SUBDIR_SCAN**：平铺扫描根目录，或按名称顺序逐个扫描子目录
//! 4. **DONE**：输出统计，关闭结果文件
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有完成记录和结果文件的模块
//! - **错误隔离**：单张图片失败不影响整批；配置错误和结果文件写入错误中止运行

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::{InferenceClient, ModelCatalog, OpenAiVisionClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::Prompt;
use crate::orchestrator::directory_processor;
use crate::services::{CompletionLedger, ResultWriter, ScanPlan, WorkEnumerator};
use crate::utils::logging;
use crate::workflow::ItemFlow;

/// 应用主结构
pub struct App<C> {
    config: Config,
    flow: ItemFlow<C>,
    enumerator: WorkEnumerator,
    ledger: CompletionLedger,
    writer: ResultWriter,
}

impl App<OpenAiVisionClient> {
    /// 使用真实推理服务初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let client = OpenAiVisionClient::new(&config);
        let app = Self::with_client(config, client).await?;

        if app.config.list_models {
            list_models(&app.config).await;
        }

        Ok(app)
    }
}

impl<C: InferenceClient> App<C> {
    /// 使用给定的推理客户端初始化应用
    ///
    /// 任何配置问题都在这里报告，此时还没有扫描目录，也没有发出请求。
    pub async fn with_client(config: Config, client: C) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);

        let prompt = Prompt::load(&config.prompt_file).await?;
        info!(
            "📝 提示词: {}",
            logging::truncate_text(prompt.as_str().trim(), 60)
        );

        let ledger = CompletionLedger::load(&config.responses_file).await?;
        let writer = ResultWriter::open(&config.responses_file)?;
        let enumerator = WorkEnumerator::new(config.filter_regex()?);
        let flow = ItemFlow::new(client, prompt, config.retry_policy());

        Ok(Self {
            config,
            flow,
            enumerator,
            ledger,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> AppResult<ProcessingStats> {
        let plan = self.enumerator.plan(&self.config.image_directory).await?;

        let per_subdir = match &plan {
            ScanPlan::Flat(root) => {
                info!("🖼️ 没有子目录，直接处理 {}", root.display());
                false
            }
            ScanPlan::PerSubdir(dirs) => {
                info!("📂 找到 {} 个子目录，逐个处理", dirs.len());
                true
            }
        };

        let dirs = plan.directories();
        let mut stats = ProcessingStats::default();
        for (idx, dir) in dirs.iter().enumerate() {
            if per_subdir {
                logging::log_directory_start(idx + 1, dirs.len(), dir);
            }
            stats.merge(&self.process_dir(dir).await?);
        }

        logging::print_final_stats(
            stats.written,
            stats.skipped,
            stats.exhausted,
            stats.unreadable,
            &self.config.responses_file,
        );

        Ok(stats)
    }

    async fn process_dir(&mut self, dir: &std::path::Path) -> AppResult<ProcessingStats> {
        let stats = directory_processor::process_directory(
            &self.flow,
            &self.enumerator,
            dir,
            &mut self.ledger,
            &mut self.writer,
        )
        .await?;
        logging::log_directory_complete(dir, stats.written, stats.total());
        Ok(stats)
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn client(&self) -> &C {
        self.flow.client()
    }
}

/// 打印支持内容生成的模型，失败只记警告
async fn list_models(config: &Config) {
    match ModelCatalog::new(config).list_generation_models().await {
        Ok(models) => {
            info!("📋 可用模型:");
            for name in models {
                info!("  {}", name);
            }
        }
        Err(e) => warn!("⚠️ 获取模型列表失败: {:#}", e),
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub written: usize,
    pub skipped: usize,
    pub exhausted: usize,
    pub unreadable: usize,
}

impl ProcessingStats {
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.exhausted + self.unreadable
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.exhausted += other.exhausted;
        self.unreadable += other.unreadable;
    }
}

