//! 远程推理客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（默认指向 Gemini 的 OpenAI 兼容端点）
//! - 图片以 base64 data URL 的形式随提示词一起发送

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::RemoteError;
use crate::models::{ImagePayload, Prompt};

/// 推理服务接口
///
/// 任何失败都以同一种 [`RemoteError`] 返回；同样的输入多次调用可能得到不同的文本。
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn submit(&self, prompt: &Prompt, image: &ImagePayload) -> Result<String, RemoteError>;
}

/// 基于 OpenAI 兼容接口的多模态客户端
pub struct OpenAiVisionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiVisionClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.api_base_url.trim_end_matches('/'));

        Self {
            client: Client::with_config(openai_config),
            model_name: config.model_name.clone(),
        }
    }

}

#[async_trait]
impl InferenceClient for OpenAiVisionClient {
    async fn submit(&self, prompt: &Prompt, image: &ImagePayload) -> Result<String, RemoteError> {
        debug!(
            "调用推理 API，模型: {}，图片 {} 字节 ({})",
            self.model_name,
            image.bytes.len(),
            image.mime_type
        );

        // 提示词原样发送，不做 trim
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: prompt.as_str().to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image.data_url(),
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| RemoteError::with_source(format!("构建请求失败: {}", e), e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .build()
            .map_err(|e| RemoteError::with_source(format!("构建请求失败: {}", e), e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RemoteError::with_source(format!("推理 API 调用失败: {}", e), e))?;

        debug!("推理 API 调用成功");

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        extract_content(&self.model_name, content)
    }
}

/// 取出响应文本；缺失或只有空白都视为失败，交给重试处理
///
/// 非空时原样返回，写入结果文件时不做任何加工。
pub fn extract_content(model_name: &str, content: Option<String>) -> Result<String, RemoteError> {
    content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| RemoteError::new(format!("模型 {} 返回内容为空", model_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_returns_text_verbatim() {
        let text = extract_content("gemini-3-pro-preview", Some(" head left, supine\n".to_string()))
            .unwrap();
        assert_eq!(text, " head left, supine\n");
    }

    #[test]
    fn test_extract_content_rejects_missing_or_blank() {
        for content in [None, Some(String::new()), Some("  \n".to_string())] {
            let err = extract_content("gemini-3-pro-preview", content).unwrap_err();
            assert!(err.message().contains("返回内容为空"));
        }
    }

    /// 需要真实凭据：
    /// ```bash
    /// GOOGLE_API_KEY=... cargo test test_submit_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_submit_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().unwrap();
        let client = OpenAiVisionClient::new(&config);

        // 1x1 透明 PNG
        let png: Vec<u8> = vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
            0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
            0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
        ];

        let text = client
            .submit(
                &Prompt::new("Describe this image in one word."),
                &ImagePayload::new(png, "image/png"),
            )
            .await
            .unwrap();

        println!("响应: {}", text);
        assert!(!text.is_empty());
    }
}
