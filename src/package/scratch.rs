use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::PackageError;

/// 单次转换独占的临时目录
///
/// - `content/`: 解包后的课件
/// - `slides/`: 每页重新编码的图片
///
/// 无论成功与否，析构时都会删除整个目录。
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    removed: bool,
}

impl ScratchDir {
    /// 创建临时目录（先清理上次异常退出留下的残留）
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, PackageError> {
        let root = root.into();
        if root.exists() {
            warn!("⚠️ 临时目录已存在，先行清理: {}", root.display());
            std::fs::remove_dir_all(&root).map_err(|source| PackageError::ScratchFailed {
                path: root.clone(),
                source,
            })?;
        }

        let scratch = Self {
            root,
            removed: false,
        };
        for dir in [scratch.content_dir(), scratch.slides_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| PackageError::ScratchFailed { path: dir, source })?;
        }
        debug!("临时目录已创建: {}", scratch.root.display());
        Ok(scratch)
    }

    /// 解包目标目录
    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    /// 临时图片目录
    pub fn slides_dir(&self) -> PathBuf {
        self.root.join("slides")
    }

    /// 显式删除临时目录
    pub fn remove(mut self) -> Result<(), PackageError> {
        self.removed = true;
        remove_tree(&self.root)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            warn!("⚠️ {}", e);
        }
    }
}

fn remove_tree(root: &Path) -> Result<(), PackageError> {
    if !root.exists() {
        return Ok(());
    }
    std::fs::remove_dir_all(root).map_err(|source| PackageError::ScratchFailed {
        path: root.to_path_buf(),
        source,
    })?;
    info!("🗑️ 临时目录已删除: {}", root.display());
    Ok(())
}
