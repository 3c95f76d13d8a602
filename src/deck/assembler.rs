use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::deck::image_normalize::normalize_to_jpeg;
use crate::deck::pptx::{DeckLayout, PptxDeck};
use crate::error::DeckError;
use crate::services::SlideCapture;

/// 幻灯片接收端
///
/// 遍历引擎按序号顺序逐页提交，单页失败由调用方记录后继续
pub trait SlideSink {
    fn submit(&mut self, capture: &SlideCapture) -> Result<(), DeckError>;
}

/// 文稿组装器
///
/// 截图先经过规范化（解码 → JPEG → 校验），再追加为一页
pub struct DeckAssembler {
    deck: PptxDeck,
    layout: DeckLayout,
    image_dir: PathBuf,
}

impl DeckAssembler {
    /// `image_dir` 用于存放每页重新编码后的临时图片
    pub fn new(layout: DeckLayout, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            deck: PptxDeck::new(layout.clone()),
            layout,
            image_dir: image_dir.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.deck = self.deck.with_title(title);
        self
    }

    pub fn slide_count(&self) -> usize {
        self.deck.slide_count()
    }

    /// 写出演示文稿（每次运行只调用一次）
    pub fn persist(&self, path: &Path) -> Result<(), DeckError> {
        self.deck.save(path)?;
        info!(
            "💾 演示文稿已保存: {} ({} 页)",
            path.display(),
            self.deck.slide_count()
        );
        Ok(())
    }
}

impl SlideSink for DeckAssembler {
    fn submit(&mut self, capture: &SlideCapture) -> Result<(), DeckError> {
        let normalized = normalize_to_jpeg(
            capture.ordinal,
            &capture.image,
            &self.image_dir,
            self.layout.jpeg_quality,
        )?;
        let caption = format_caption(&self.layout.caption_prefix, &capture.text);
        debug!(
            "追加幻灯片 {}: {}x{}, 文本 {} 字符",
            capture.ordinal,
            normalized.width,
            normalized.height,
            caption.chars().count()
        );
        self.deck.add_slide(normalized.bytes, caption);
        Ok(())
    }
}

/// 文本框内容：前缀 + 文本（换行折叠为空格）
pub fn format_caption(prefix: &str, text: &str) -> String {
    let flattened = match Regex::new(r"\r\n|[\r\n]") {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(_) => text.replace('\n', " "),
    };
    format!("{prefix}{flattened}")
}
