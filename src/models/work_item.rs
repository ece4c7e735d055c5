use std::path::{Path, PathBuf};

use base64::Engine as _;

/// 一张待处理的图片
///
/// 以文件名作为唯一标识；只在扫描时创建，处理结束后丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 所在目录
    pub dir: PathBuf,
    /// 文件名（也是结果文件中的键）
    pub filename: String,
}

impl WorkItem {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }
}

/// 发送给远端的图片内容（不做解码）
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: &'static str) -> Self {
        Self { bytes, mime_type }
    }

    /// 读取图片文件的原始字节
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(bytes, mime_for(path)))
    }

    /// `data:<mime>;base64,<...>` 形式的 URL
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// 按扩展名推断 MIME 类型
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
