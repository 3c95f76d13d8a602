//! 文稿组装
//!
//! 接收按序号排列的 (截图, 文本)，生成 .pptx 演示文稿

pub mod assembler;
pub mod image_normalize;
pub mod pptx;

pub use assembler::{format_caption, DeckAssembler, SlideSink};
pub use image_normalize::{normalize_to_jpeg, NormalizedImage};
pub use pptx::{DeckLayout, PptxDeck};
