use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::PackageError;

/// 在内容目录中查找课件包
///
/// 递归扫描 `dir`，收集所有扩展名为 `extension`（大小写不敏感）的文件，
/// 按完整路径排序后取第一个。存在多个候选时记录警告。
pub fn find_course_package(dir: &Path, extension: &str) -> Result<PathBuf, PackageError> {
    if !dir.is_dir() {
        return Err(PackageError::NotFound {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|source| PackageError::WalkFailed {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            debug!("候选课件包: {}", entry.path().display());
            candidates.push(entry.into_path());
        }
    }
    candidates.sort();

    let mut iter = candidates.into_iter();
    let Some(first) = iter.next() else {
        return Err(PackageError::NotFound {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    };

    for ignored in iter {
        warn!("⚠️ 发现多个课件包，忽略: {}", ignored.display());
    }
    info!("✓ 找到课件包: {}", first.display());
    Ok(first)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = find_course_package(&tmp.path().join("absent"), "iso").unwrap_err();
        assert!(matches!(err, PackageError::NotFound { .. }));
    }

    #[test]
    fn test_no_archive_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("readme.txt"), b"hello").unwrap();
        let err = find_course_package(tmp.path(), "iso").unwrap_err();
        assert!(matches!(err, PackageError::NotFound { .. }));
    }

    #[test]
    fn test_lexicographic_first_match_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::write(tmp.path().join("b/course.iso"), b"").unwrap();
        fs::write(tmp.path().join("a.ISO"), b"").unwrap();
        fs::write(tmp.path().join("c.iso"), b"").unwrap();

        let found = find_course_package(tmp.path(), "iso").unwrap();
        assert_eq!(found, tmp.path().join("a.ISO"));
    }

    #[test]
    fn test_directory_named_like_archive_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("fake.iso")).unwrap();
        fs::write(tmp.path().join("fake.iso/real.iso"), b"").unwrap();

        let found = find_course_package(tmp.path(), "iso").unwrap();
        assert_eq!(found, tmp.path().join("fake.iso/real.iso"));
    }
}
