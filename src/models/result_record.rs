//! 结果行格式
//!
//! 结果文件每行格式为 `<文件名>, <响应文本>\n`，必须与已有结果文件逐字节兼容。
//! 响应文本不做转义；续跑判定只依赖第一个逗号之前的字段。

/// 一条成功的推理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub filename: String,
    pub response_text: String,
}

impl ResultRecord {
    pub fn new(filename: impl Into<String>, response_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            response_text: response_text.into(),
        }
    }

    /// 渲染为结果文件中的一行（含换行符）
    pub fn to_line(&self) -> String {
        format!("{}, {}\n", self.filename, self.response_text)
    }

    /// 取出一行的键：去掉首尾空白后第一个逗号之前的字段
    pub fn parse_key(line: &str) -> Option<&str> {
        let key = line.trim().split(',').next()?.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}
