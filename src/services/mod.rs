//! 业务能力层（Services）
//!
//! 描述"我能对当前页面做什么"，只处理当前这一页：
//! - `NextControlProbe` - 查找并点击"下一页"
//! - `ControlSuppressor` - 隐藏播放器控件
//! - `capture_slide` - 截图 + 提取文本

pub mod capture;
pub mod control_suppressor;
pub mod next_control;

pub use capture::{capture_slide, extract_text, SlideCapture};
pub use control_suppressor::ControlSuppressor;
pub use next_control::{AdvanceDecision, NextControlProbe};
