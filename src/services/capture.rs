//! 单页截图与文本提取

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::BrowserError;
use crate::infrastructure::RenderSession;
use crate::workflow::SlideCtx;

const EXTRACT_TEXT_JS: &str =
    "(function() { return document.body ? document.body.innerText : ''; })()";

/// 一页的采集结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideCapture {
    /// 序号（从 1 开始，连续递增）
    pub ordinal: u32,
    /// 截图原始字节
    pub image: Vec<u8>,
    /// 页面可见文本，可能为空
    pub text: String,
}

/// 读取页面可见文本
pub async fn extract_text<S: RenderSession + ?Sized>(session: &mut S) -> Result<String, BrowserError> {
    match session.evaluate(EXTRACT_TEXT_JS).await? {
        JsonValue::String(text) => Ok(text),
        JsonValue::Null => Ok(String::new()),
        other => Err(BrowserError::UnexpectedResult(other.to_string())),
    }
}

/// 采集当前页
///
/// 截图失败直接返回错误；文本提取失败只记录警告，以空文本继续
pub async fn capture_slide<S: RenderSession + ?Sized>(
    session: &mut S,
    ctx: &SlideCtx,
) -> Result<SlideCapture, BrowserError> {
    let image = session.screenshot().await?;

    let text = match extract_text(session).await {
        Ok(text) => text,
        Err(e) => {
            warn!("{} ⚠️ 无法提取文本: {}", ctx, e);
            String::new()
        }
    };

    Ok(SlideCapture {
        ordinal: ctx.ordinal,
        image,
        text,
    })
}
