use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::RenderSession;

/// 播放器控件隐藏器
///
/// 注入一段样式，把进度条、播放按钮等交互控件隐藏，保证截图干净
#[derive(Debug, Clone)]
pub struct ControlSuppressor {
    script: Option<String>,
}

impl ControlSuppressor {
    pub fn new(selectors: &[String]) -> Self {
        let script = (!selectors.is_empty()).then(|| build_suppress_script(selectors));
        Self { script }
    }

    /// 注入样式；没有配置选择器时什么也不做
    pub async fn suppress<S: RenderSession + ?Sized>(&self, session: &mut S) -> Result<(), BrowserError> {
        let Some(script) = &self.script else {
            debug!("未配置需要隐藏的控件");
            return Ok(());
        };
        session.evaluate(script).await?;
        Ok(())
    }
}

fn build_suppress_script(selectors: &[String]) -> String {
    let css = format!("{} {{ display: none !important; }}", selectors.join(", "));
    let css = serde_json::to_string(&css).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(function() {{
    const style = document.createElement('style');
    style.setAttribute('data-course-deck', 'hide-controls');
    style.innerHTML = {css};
    (document.head || document.documentElement).appendChild(style);
    return true;
}})()"#
    )
}
