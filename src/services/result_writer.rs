//! 结果写入服务 - 业务能力层
//!
//! 只负责"追加一行结果并落盘"能力，不关心流程

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::ResultRecord;
use crate::services::CompletionLedger;

/// 结果写入服务
///
/// 职责：
/// - 每次运行只打开一次结果文件（追加模式）
/// - 每行写完立即 flush + sync，之后才更新完成记录
/// - 独占结果文件的写权限
pub struct ResultWriter {
    path: PathBuf,
    file: File,
}

impl ResultWriter {
    /// 以追加模式打开（不存在则创建）结果文件
    ///
    /// 已有内容不以换行结尾时（写到一半被终止，或被编辑器去掉了末尾换行），
    /// 先补一个换行并落盘，新结果行不会接在旧行后面。
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let unavailable = |source| ConfigError::StoreUnavailable {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(unavailable)?;

        if ends_without_newline(&mut file).map_err(unavailable)? {
            warn!("⚠️ 结果文件末尾缺少换行，已补齐: {}", path.display());
            file.write_all(b"\n")
                .and_then(|_| file.sync_data())
                .map_err(unavailable)?;
        }

        Ok(Self { path, file })
    }

    /// 写入一条结果
    ///
    /// 顺序不可调换：写入 → flush → sync → 标记完成。
    /// 进程在标记之前被终止时，下次启动会从结果文件重新得到这条记录。
    pub fn write(&mut self, record: &ResultRecord, ledger: &mut CompletionLedger) -> AppResult<()> {
        let line = record.to_line();
        debug!(
            "写入结果: {} | 响应长度: {}",
            record.filename,
            record.response_text.len()
        );

        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data())
            .map_err(|e| AppError::store_write(&self.path, e))?;

        ledger.mark(&record.filename);
        info!("✅ {}", line.trim_end_matches('\n'));

        Ok(())
    }
}

/// 非空且最后一个字节不是换行
fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
