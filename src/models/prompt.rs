//! 提示词
//!
//! 每次运行只加载一次，之后所有图片共享同一份只读内容。

use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;

/// 不可变的提示词文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(Arc<str>);

impl Prompt {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// 读取整个提示词文件，内容原样保留（包括末尾空白）
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::PromptUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_keeps_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt_text.txt");
        std::fs::write(&path, "Where is the infant's head?\nAnswer only, no explanation\n\n").unwrap();

        let prompt = Prompt::load(&path).await.unwrap();
        assert_eq!(
            prompt.as_str(),
            "Where is the infant's head?\nAnswer only, no explanation\n\n"
        );
    }

    #[tokio::test]
    async fn test_missing_prompt_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Prompt::load(&dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, ConfigError::PromptUnreadable { .. }));
    }
}
