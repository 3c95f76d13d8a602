use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::BrowserError;

/// 渲染会话
///
/// 一个浏览器页面上下文的同步外观：每个调用发出一条命令并等待响应。
/// 遍历引擎独占会话，调用之间从不并发。
#[async_trait]
pub trait RenderSession: Send {
    /// 导航到指定 URL
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// 在页面中执行脚本表达式，`undefined` 返回 `Null`
    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, BrowserError>;

    /// 截取当前视口（PNG）
    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError>;
}
