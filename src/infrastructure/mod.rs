//! 基础设施层
//!
//! 持有稀缺资源（Page），只暴露导航、执行脚本、截图三种能力

pub mod js_executor;
pub mod render_session;

pub use js_executor::JsExecutor;
pub use render_session::RenderSession;

#[cfg(test)]
pub(crate) mod fake;
