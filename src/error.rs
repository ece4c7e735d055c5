use std::path::PathBuf;

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
///
/// 只有会中止整个批次的错误才会出现在这里；单张图片的失败
/// 由 [`RemoteError`] / [`RetryExhausted`] 表示，并在图片级别被吸收。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（启动阶段，任何提交之前）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 结果文件写入失败，持久性无法再保证
    #[error("写入结果文件失败 ({path}): {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 扫描图片目录失败
    #[error("扫描目录失败 ({path}): {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在或为空")]
    EnvVarNotFound { var_name: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 文件名过滤正则无效
    #[error("文件名过滤正则无效 '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// 重试次数必须至少为 1
    #[error("最大重试次数必须大于 0")]
    ZeroRetries,

    /// 重试基础间隔超出上限
    #[error("重试基础间隔 {secs} 秒超出上限 {max} 秒")]
    RetryDelayTooLarge { secs: u64, max: u64 },

    /// 提示词文件无法读取
    #[error("无法读取提示词文件 ({path}): {source}")]
    PromptUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 已有结果文件无法读取或无法以追加模式打开
    #[error("无法打开结果文件 ({path}): {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 图片根目录不存在
    #[error("图片目录不存在: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// 配置文件读取失败
    #[error("无法读取配置文件 ({path}): {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 远程推理调用错误
///
/// 远端的所有失败（网络、配额、响应格式）都统一为这一种错误，
/// 重试控制器不区分子类型。
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RemoteError {
    /// 仅包含描述信息的远程错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// 包装底层错误
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 单张图片重试耗尽
#[derive(Debug, Error)]
#[error("图片 {item} 在 {attempts} 次尝试后仍然失败: {last_error}")]
pub struct RetryExhausted {
    /// 图片文件名
    pub item: String,
    /// 实际调用次数
    pub attempts: u32,
    /// 最后一次失败的原因
    #[source]
    pub last_error: RemoteError,
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建结果文件写入错误
    pub fn store_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::StoreWrite {
            path: path.into(),
            source,
        }
    }

    /// 创建目录扫描错误
    pub fn scan(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Scan {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_remote_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let err = RemoteError::with_source("远程推理调用失败", io);

        assert_eq!(err.message(), "远程推理调用失败");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_retry_exhausted_display_mentions_item_and_attempts() {
        let err = RetryExhausted {
            item: "001.jpg".to_string(),
            attempts: 4,
            last_error: RemoteError::new("quota"),
        };

        let text = err.to_string();
        assert!(text.contains("001.jpg"));
        assert!(text.contains('4'));
        assert!(text.contains("quota"));
    }

    #[test]
    fn test_config_error_converts_into_app_error() {
        let err: AppError = ConfigError::ZeroRetries.into();
        assert!(matches!(err, AppError::Config(ConfigError::ZeroRetries)));
    }
}
