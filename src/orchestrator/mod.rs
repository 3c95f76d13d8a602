//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有本次转换的全部稀缺资源，按获取顺序建立、按相反顺序释放：
//!
//! ```text
//! 课件包 → 临时目录 → 解包 → 内容服务 → 无头浏览器
//!     ↓
//! workflow::TraversalEngine (逐页遍历)
//!     ↓
//! 关闭浏览器 → 停止服务 → 删除临时目录 → 写出演示文稿
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod converter;

pub use converter::{run_conversion, App, PreparedContent};
