//! 模型列表诊断
//!
//! 启动时列出支持内容生成的模型，仅用于提示，失败不影响批处理。

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

/// 支持内容生成的动作名
const GENERATE_ACTION: &str = "generateContent";

/// 模型列表客户端
pub struct ModelCatalog {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ModelCatalog {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// 获取支持内容生成的模型名称
    pub async fn list_generation_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        debug!("获取模型列表: {}", url);

        let body: Value = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("模型列表请求失败: {}", url))?
            .error_for_status()
            .context("模型列表返回错误状态")?
            .json()
            .await
            .context("模型列表 JSON 解析失败")?;

        Ok(generation_models(&body))
    }
}

/// 从模型列表响应中挑出支持内容生成的模型
///
/// 兼容两种格式：OpenAI 风格的 `data[].id`，以及带
/// `supportedGenerationMethods` / `supported_actions` 的 `models[].name`。
/// 没有声明动作的模型一律保留。
pub fn generation_models(body: &Value) -> Vec<String> {
    let entries = body
        .get("data")
        .or_else(|| body.get("models"))
        .and_then(Value::as_array);

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| {
            let actions = entry
                .get("supportedGenerationMethods")
                .or_else(|| entry.get("supported_actions"))
                .and_then(Value::as_array);
            match actions {
                Some(actions) => actions.iter().any(|a| a.as_str() == Some(GENERATE_ACTION)),
                None => true,
            }
        })
        .filter_map(|entry| {
            entry
                .get("id")
                .or_else(|| entry.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}
