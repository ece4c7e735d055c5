//! 图片扫描 - 业务能力层
//!
//! 只负责"列出要处理的图片"能力。根目录没有子目录时直接扫描根目录；
//! 否则按名称顺序分别扫描每个直接子目录，此时根目录里的文件不会被处理。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use regex::Regex;
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::WorkItem;

/// 扫描计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan {
    /// 图片直接位于根目录
    Flat(PathBuf),
    /// 每个子目录单独扫描（已排序）
    PerSubdir(Vec<PathBuf>),
}

impl ScanPlan {
    /// 需要扫描的目录，按处理顺序
    pub fn directories(&self) -> Vec<&Path> {
        match self {
            ScanPlan::Flat(root) => vec![root.as_path()],
            ScanPlan::PerSubdir(dirs) => dirs.iter().map(PathBuf::as_path).collect(),
        }
    }
}

/// 图片扫描器
pub struct WorkEnumerator {
    pattern: Regex,
}

impl WorkEnumerator {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// 决定扫描方式
    pub async fn plan(&self, root: &Path) -> AppResult<ScanPlan> {
        let is_dir = fs::metadata(root).await.map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Err(ConfigError::DirectoryNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }

        let mut subdirs = Vec::new();
        for name in sorted_entries(root).await? {
            let path = root.join(&name);
            // 指向目录的符号链接也算子目录
            if fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
                subdirs.push(path);
            }
        }

        if subdirs.is_empty() {
            Ok(ScanPlan::Flat(root.to_path_buf()))
        } else {
            Ok(ScanPlan::PerSubdir(subdirs))
        }
    }

    /// 扫描单个目录，返回按文件名排序、匹配正则的普通文件
    pub async fn scan(&self, dir: &Path) -> AppResult<Vec<WorkItem>> {
        let mut items = Vec::new();

        for name in sorted_entries(dir).await? {
            let Some(filename) = name.to_str() else {
                debug!("跳过非 UTF-8 文件名: {:?}", name);
                continue;
            };

            if !self.pattern.is_match(filename) {
                continue;
            }

            let is_file = fs::metadata(dir.join(filename))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                debug!("跳过非普通文件: {}", filename);
                continue;
            }

            items.push(WorkItem::new(dir, filename));
        }

        Ok(items)
    }
}

/// 读取目录项名称并按字典序排序
async fn sorted_entries(dir: &Path) -> AppResult<Vec<OsString>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::scan(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::scan(dir, e))?
    {
        names.push(entry.file_name());
    }
    names.sort();

    Ok(names)
}
