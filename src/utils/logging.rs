/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；否则 `verbose` 时为 debug，默认为 info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🖼️ 图片目录: {}", config.image_directory.display());
    info!("🔎 文件名过滤: {}", config.filter_re);
    info!("🤖 模型: {}", config.model_name);
    info!("🔑 {}: {}", crate::config::API_KEY_ENV, config.masked_api_key());
    info!(
        "🔁 最大重试: {} 次，基础间隔 {} 秒",
        config.max_retries, config.retry_delay_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录子目录开始信息
pub fn log_directory_start(index: usize, total: usize, dir: &Path) {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());

    info!("\n{}", "=".repeat(60));
    info!("📦 子目录 {}/{}: {}", index, total, name);
    info!("{}", "=".repeat(60));
}

/// 记录目录完成信息
pub fn log_directory_complete(dir: &Path, written: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ {} 完成: 新写入 {}/{}", dir.display(), written, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    written: usize,
    skipped: usize,
    exhausted: usize,
    unreadable: usize,
    responses_file: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 新写入: {}", written);
    info!("⏭️ 已存在跳过: {}", skipped);
    info!("❌ 重试耗尽: {}", exhausted);
    if unreadable > 0 {
        info!("🚫 无法读取: {}", unreadable);
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", responses_file.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
