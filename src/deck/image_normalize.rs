//! 截图规范化
//!
//! 文稿后端对部分合法图片也会拒收，所以统一解码后重新编码为固定质量的 JPEG，
//! 再从磁盘读回尺寸做校验。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

use crate::error::DeckError;

/// 重新编码后的图片
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// 解码截图并以 JPEG 写入 `dir/slide-NNN.jpg`
pub fn normalize_to_jpeg(
    ordinal: u32,
    image: &[u8],
    dir: &Path,
    quality: u8,
) -> Result<NormalizedImage, DeckError> {
    let decoded = image::load_from_memory(image)
        .map_err(|source| DeckError::DecodeFailed { ordinal, source })?;
    let rgb = decoded.to_rgb8();

    let path = dir.join(format!("slide-{ordinal:03}.jpg"));
    let io_err = |source| DeckError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&rgb)
        .map_err(|source| DeckError::EncodeFailed {
            path: path.clone(),
            source,
        })?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    let (width, height) = image::image_dimensions(&path).map_err(|source| DeckError::VerifyFailed {
        path: path.clone(),
        source,
    })?;
    if width == 0 || height == 0 {
        return Err(DeckError::InvalidSize {
            path: path.clone(),
            width,
            height,
        });
    }

    let bytes = std::fs::read(&path).map_err(io_err)?;
    debug!(
        "图片已校验: {} ({} 字节, {}x{})",
        path.display(),
        bytes.len(),
        width,
        height
    );

    Ok(NormalizedImage {
        path,
        width,
        height,
        bytes,
    })
}
