use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use image_prompt_batch::utils::logging;
use image_prompt_batch::{App, Config};

/// 把图片逐张连同同一段提示词发送给多模态模型，结果追加到结果文件
#[derive(Parser, Debug)]
#[command(name = "image-prompt-batch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send every matching image plus a fixed prompt to a multimodal model", long_about = None)]
struct Cli {
    /// Directory containing input images (or one level of subdirectories)
    #[arg(long)]
    image_directory: Option<PathBuf>,

    /// Regular expression for image filename match criterion
    #[arg(long)]
    filter_re: Option<String>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,

    /// File holding the prompt text
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Append-only results file, also used to resume
    #[arg(long)]
    responses_file: Option<PathBuf>,

    /// Attempts per image before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// Base delay of the linear backoff, in seconds
    #[arg(long)]
    retry_delay_secs: Option<u64>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print models that support content generation before processing
    #[arg(long)]
    list_models: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 默认值 < 配置文件 < 环境变量 < 命令行
    fn into_config(self) -> Result<Config> {
        let mut config = Config::default();
        if let Some(path) = &self.config {
            config = config.load_file(path)?;
        }
        let mut config = config.with_env()?;

        if let Some(v) = self.image_directory {
            config.image_directory = v;
        }
        if let Some(v) = self.filter_re {
            config.filter_re = v;
        }
        if let Some(v) = self.model {
            config.model_name = v;
        }
        if let Some(v) = self.prompt_file {
            config.prompt_file = v;
        }
        if let Some(v) = self.responses_file {
            config.responses_file = v;
        }
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = self.retry_delay_secs {
            config.retry_delay_secs = v;
        }
        config.list_models |= self.list_models;
        config.verbose_logging |= self.verbose;

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
