//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，实现 [`RenderSession`]

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::RenderSession;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 navigate / eval / screenshot 能力
/// - 不认识幻灯片，不处理遍历流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 表达式并返回 JSON 结果
    ///
    /// 统一走 `Runtime.evaluate`，不让 chromiumoxide 猜测是否为函数声明
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, BrowserError> {
        let params = EvaluateParams::builder()
            .expression(js_code.into())
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(BrowserError::script)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }
}

#[async_trait]
impl RenderSession for JsExecutor {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::navigation(url, e))?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, BrowserError> {
        self.eval(script).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page.screenshot(params).await.map_err(BrowserError::screenshot)
    }
}
