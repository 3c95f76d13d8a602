//! 幻灯片处理上下文
//!
//! 封装"我正在处理第几页"这一信息

use std::fmt::Display;

/// 幻灯片处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideCtx {
    /// 序号（从1开始）
    pub ordinal: u32,

    /// 安全上限（仅用于日志显示）
    pub max_slides: u32,
}

impl SlideCtx {
    pub fn new(ordinal: u32, max_slides: u32) -> Self {
        Self {
            ordinal,
            max_slides,
        }
    }

    /// 是否已到达安全上限
    pub fn at_bound(&self) -> bool {
        self.ordinal >= self.max_slides
    }
}

impl Display for SlideCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[幻灯片 {}/{}]", self.ordinal, self.max_slides)
    }
}
