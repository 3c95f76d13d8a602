//! ISO 9660 解包
//!
//! 把光盘镜像中的目录树原样写到本地磁盘

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use cdfs::{DirectoryEntry, ISODirectory, ISO9660};
use tracing::{debug, info, warn};

use crate::error::PackageError;

/// 解包统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// 在阻塞线程池中解包，避免占用异步运行时
pub async fn extract_iso(image: &Path, dest: &Path) -> Result<ExtractSummary, PackageError> {
    let image = image.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || extract_iso_blocking(&image, &dest))
        .await
        .map_err(|e| PackageError::TaskFailed(e.to_string()))?
}

/// 解包 `image` 到 `dest`
pub fn extract_iso_blocking(image: &Path, dest: &Path) -> Result<ExtractSummary, PackageError> {
    info!("📦 正在解包: {} → {}", image.display(), dest.display());

    let file = File::open(image).map_err(|source| PackageError::OpenFailed {
        path: image.to_path_buf(),
        source,
    })?;
    let iso = ISO9660::new(file).map_err(|source| PackageError::IsoReadFailed {
        path: image.to_path_buf(),
        source,
    })?;

    std::fs::create_dir_all(dest).map_err(|source| PackageError::WriteFailed {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut summary = ExtractSummary::default();
    extract_dir(image, iso.root(), dest, &mut summary)?;

    info!(
        "✓ 解包完成: {} 个文件, {} 个目录, 共 {} 字节",
        summary.files, summary.directories, summary.bytes
    );
    Ok(summary)
}

fn extract_dir(
    image: &Path,
    dir: &ISODirectory<File>,
    dest: &Path,
    summary: &mut ExtractSummary,
) -> Result<(), PackageError> {
    for entry in dir.contents() {
        let entry = entry.map_err(|source| PackageError::IsoReadFailed {
            path: image.to_path_buf(),
            source,
        })?;

        match entry {
            DirectoryEntry::Directory(sub) => {
                let Some(name) = entry_name(&sub.identifier) else {
                    continue;
                };
                let target = dest.join(&name);
                std::fs::create_dir_all(&target).map_err(|source| PackageError::WriteFailed {
                    path: target.clone(),
                    source,
                })?;
                summary.directories += 1;
                extract_dir(image, &sub, &target, summary)?;
            }
            DirectoryEntry::File(file) => {
                let Some(name) = entry_name(&file.identifier) else {
                    warn!("⚠️ 跳过非法文件名: {:?}", file.identifier);
                    continue;
                };
                let target = dest.join(&name);
                let written = write_file(&target, &mut file.read())?;
                debug!("解包文件: {} ({} 字节)", target.display(), written);
                summary.files += 1;
                summary.bytes += written;
            }
            _ => {
                debug!("跳过不支持的目录项");
            }
        }
    }
    Ok(())
}

fn write_file(target: &Path, reader: &mut impl io::Read) -> Result<u64, PackageError> {
    let to_err = |source| PackageError::WriteFailed {
        path: target.to_path_buf(),
        source,
    };
    let out = File::create(target).map_err(to_err)?;
    let mut out = BufWriter::new(out);
    let written = io::copy(reader, &mut out).map_err(to_err)?;
    io::Write::flush(&mut out).map_err(to_err)?;
    Ok(written)
}

/// 把 ISO 目录项标识符转换为安全的本地文件名
///
/// 去掉版本号后缀（`;1`）和 level-1 无扩展名文件的结尾点号，
/// 跳过自身/父目录项以及任何可能逃逸出目标目录的名字。
fn entry_name(identifier: &str) -> Option<PathBuf> {
    let name = identifier.split(';').next().unwrap_or_default();
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty()
        || name == "."
        || name == ".."
        || name == "\u{0}"
        || name == "\u{1}"
        || name.contains(['/', '\\'])
    {
        return None;
    }
    Some(PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_strips_version_suffix() {
        assert_eq!(entry_name("STORY.HTML;1"), Some(PathBuf::from("STORY.HTML")));
        assert_eq!(entry_name("README.;1"), Some(PathBuf::from("README")));
        assert_eq!(entry_name("story.html"), Some(PathBuf::from("story.html")));
    }

    #[test]
    fn test_entry_name_rejects_special_entries() {
        assert_eq!(entry_name("."), None);
        assert_eq!(entry_name(".."), None);
        assert_eq!(entry_name("\u{0}"), None);
        assert_eq!(entry_name("\u{1}"), None);
        assert_eq!(entry_name("../escape"), None);
        assert_eq!(entry_name(""), None);
    }

    #[test]
    fn test_missing_image_fails_to_open() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_iso_blocking(&tmp.path().join("none.iso"), &tmp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, PackageError::OpenFailed { .. }));
    }

    #[test]
    fn test_garbage_image_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let image = tmp.path().join("broken.iso");
        std::fs::write(&image, vec![0u8; 4096]).unwrap();
        let err = extract_iso_blocking(&image, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, PackageError::IsoReadFailed { .. }));
    }

    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/course.iso")
    }

    #[test]
    fn test_extracts_nested_tree_without_version_suffixes() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("content");

        let summary = extract_iso_blocking(&fixture(), &dest).unwrap();

        assert_eq!(
            summary,
            ExtractSummary {
                files: 2,
                directories: 1,
                bytes: 49,
            }
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("STORY.HTML")).unwrap(),
            "<html><body>Page 1</body></html>\n"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("HTML5/DATA.JS")).unwrap(),
            "var slides = 3;\n"
        );
        assert!(!dest.join("STORY.HTML;1").exists());

        let mut top: Vec<String> = std::fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        top.sort();
        assert_eq!(top, vec!["HTML5", "STORY.HTML"]);
    }

    #[tokio::test]
    async fn test_async_extract_matches_blocking() {
        let tmp = tempfile::tempdir().unwrap();
        let summary = extract_iso(&fixture(), &tmp.path().join("content")).await.unwrap();
        assert_eq!(summary.files, 2);
        assert!(tmp.path().join("content/HTML5/DATA.JS").is_file());
    }
}
