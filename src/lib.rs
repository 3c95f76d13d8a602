//! # Course Deck
//!
//! 把打包好的课件光盘镜像（含 `story.html` 播放器）逐页截图，转换为 PPTX 演示文稿
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `package/` - 定位课件包、解包到临时目录
//! - `server/` - 在本机临时端口上提供解包后的内容
//! - `browser/` - 启动无头浏览器
//! - `infrastructure/` - 持有稀缺资源（Page），`JsExecutor` 实现 `RenderSession`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理当前这一页
//! - `capture_slide` - 截图 + 可见文本
//! - `NextControlProbe` - 查找并点击"下一页"
//! - `ControlSuppressor` - 隐藏播放器控件
//! - `deck/` - 图片规范化与 PPTX 写出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"整套课件"的遍历流程
//! - `SlideCtx` - 上下文封装（序号 + 上限）
//! - `TraversalEngine` - 状态机（settle → capture → submit → advance）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 获取资源、运行遍历、逆序释放、写出文稿
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod deck;
pub mod error;
pub mod infrastructure;
pub mod orchestrator;
pub mod package;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{launch_headless_browser, BrowserHandle, LaunchOptions};
pub use config::Config;
pub use deck::{DeckAssembler, DeckLayout, PptxDeck, SlideSink};
pub use error::{AppError, AppResult};
pub use infrastructure::{JsExecutor, RenderSession};
pub use orchestrator::{run_conversion, App, PreparedContent};
pub use services::{AdvanceDecision, NextControlProbe, SlideCapture};
pub use workflow::{EndReason, SlideCtx, TraversalConfig, TraversalEngine, TraversalReport, TraversalState};
