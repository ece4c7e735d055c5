//! 程序配置
//!
//! 配置按以下顺序逐层覆盖：默认值 < TOML 配置文件 < 环境变量 < 命令行参数。
//! 命令行覆盖在 `main.rs` 中完成。

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::RetryPolicy;

/// 凭据所在的环境变量
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// 重试基础间隔上限（秒）
pub const MAX_RETRY_DELAY_SECS: u64 = 3600;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 图片根目录
    pub image_directory: PathBuf,
    /// 文件名过滤正则（在文件名任意位置匹配）
    pub filter_re: String,
    /// 模型名称
    pub model_name: String,
    /// 提示词文件
    pub prompt_file: PathBuf,
    /// 结果文件（只追加）
    pub responses_file: PathBuf,
    /// 单张图片最多调用次数
    pub max_retries: u32,
    /// 线性退避的基础间隔（秒）
    pub retry_delay_secs: u64,
    // --- LLM 配置 ---
    pub api_key: String,
    pub api_base_url: String,
    /// 启动时列出可用模型
    pub list_models: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_directory: PathBuf::from("images/"),
            filter_re: "[0-9].(jpg|png)$".to_string(),
            model_name: "gemini-3-pro-preview".to_string(),
            prompt_file: PathBuf::from("prompt_text.txt"),
            responses_file: PathBuf::from("responses.txt"),
            max_retries: 4,
            retry_delay_secs: 1,
            api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
            list_models: false,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    image_directory: Option<PathBuf>,
    filter_re: Option<String>,
    model_name: Option<String>,
    prompt_file: Option<PathBuf>,
    responses_file: Option<PathBuf>,
    max_retries: Option<u32>,
    retry_delay_secs: Option<u64>,
    api_base_url: Option<String>,
    list_models: Option<bool>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 默认值叠加环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// 用进程环境变量覆盖当前配置
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// 用任意变量来源覆盖当前配置
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = key;
        }
        if let Some(url) = lookup("LLM_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL_NAME") {
            self.model_name = model;
        }
        if let Some(value) = lookup("MAX_RETRIES") {
            self.max_retries = parse_var("MAX_RETRIES", value, "u32")?;
        }
        if let Some(value) = lookup("RETRY_DELAY_SECS") {
            self.retry_delay_secs = parse_var("RETRY_DELAY_SECS", value, "u64")?;
        }
        if let Some(value) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", value, "bool")?;
        }
        Ok(self)
    }

    /// 读取 TOML 配置文件并覆盖当前配置
    ///
    /// 凭据不允许写在配置文件里，只能来自环境变量。
    pub fn load_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;

        let file: FileConfig =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(v) = file.image_directory {
            self.image_directory = v;
        }
        if let Some(v) = file.filter_re {
            self.filter_re = v;
        }
        if let Some(v) = file.model_name {
            self.model_name = v;
        }
        if let Some(v) = file.prompt_file {
            self.prompt_file = v;
        }
        if let Some(v) = file.responses_file {
            self.responses_file = v;
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.retry_delay_secs {
            self.retry_delay_secs = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.list_models {
            self.list_models = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }

        Ok(self)
    }

    /// 在任何目录扫描之前检查配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: API_KEY_ENV.to_string(),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if self.retry_delay_secs > MAX_RETRY_DELAY_SECS {
            return Err(ConfigError::RetryDelayTooLarge {
                secs: self.retry_delay_secs,
                max: MAX_RETRY_DELAY_SECS,
            });
        }
        self.filter_regex()?;
        Ok(())
    }

    /// 编译文件名过滤正则
    pub fn filter_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.filter_re).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.filter_re.clone(),
            source,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.retry_delay_secs))
    }

    /// 日志里显示的凭据，只保留前 4 位
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            return "<未设置>".to_string();
        }
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{}****", prefix)
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: String,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_batch_conventions() {
        let config = Config::default();
        assert_eq!(config.filter_re, "[0-9].(jpg|png)$");
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.retry_delay_secs, 1);
        assert_eq!(config.responses_file, PathBuf::from("responses.txt"));
        assert_eq!(config.prompt_file, PathBuf::from("prompt_text.txt"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = Config::default()
            .with_vars(vars(&[
                ("GOOGLE_API_KEY", "abcdef123"),
                ("MAX_RETRIES", "6"),
                ("LLM_MODEL_NAME", "gemini-2.5-flash"),
            ]))
            .unwrap();

        assert_eq!(config.api_key, "abcdef123");
        assert_eq!(config.max_retries, 6);
        assert_eq!(config.model_name, "gemini-2.5-flash");
        assert_eq!(config.masked_api_key(), "abcd****");
    }

    #[test]
    fn test_env_parse_failure_is_reported() {
        let err = Config::default()
            .with_vars(vars(&[("MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { .. }));
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_zero_retries_and_bad_regex_fail_validation() {
        let mut config = Config {
            api_key: "key".to_string(),
            ..Config::default()
        };
        config.max_retries = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRetries)));

        config.max_retries = 4;
        config.filter_re = "([0-9".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_retry_delay_is_bounded() {
        let mut config = Config {
            api_key: "key".to_string(),
            retry_delay_secs: u64::MAX,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RetryDelayTooLarge { secs: u64::MAX, .. })
        ));

        config.retry_delay_secs = MAX_RETRY_DELAY_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_file_overlays_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(
            &path,
            "image_directory = \"scans\"\nmax_retries = 2\nmodel_name = \"gemini-2.5-pro\"\n",
        )
        .unwrap();

        let config = Config::default().load_file(&path).unwrap();
        assert_eq!(config.image_directory, PathBuf::from("scans"));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.model_name, "gemini-2.5-pro");
        assert_eq!(config.retry_delay_secs, 1);
    }

    #[test]
    fn test_toml_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, "api_key = \"secret\"\n").unwrap();

        let err = Config::default().load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }
}
