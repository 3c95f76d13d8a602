//! "下一页"控件探测 - 业务能力层
//!
//! 课件播放器的标记不受控，不同版本的按钮写法各不相同，
//! 因此按优先级依次尝试一组选择器，取第一个命中的元素。

use serde::Deserialize;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::RenderSession;

/// 一次前进尝试的结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceDecision {
    /// 找到可用按钮并已点击
    Advanced { selector: String },
    /// 找到按钮但处于禁用状态
    Disabled { selector: String },
    /// 所有选择器都没有命中
    NoControl,
}

impl AdvanceDecision {
    /// 是否应当停止遍历
    pub fn is_stop(&self) -> bool {
        !matches!(self, AdvanceDecision::Advanced { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProbeStatus {
    Advanced,
    Disabled,
    Missing,
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    status: ProbeStatus,
    selector: Option<String>,
}

/// "下一页"探测器
///
/// 查找、禁用判断、点击在同一段脚本里完成，中间不会被页面状态变化打断。
#[derive(Debug, Clone)]
pub struct NextControlProbe {
    script: String,
}

impl NextControlProbe {
    /// 按优先级创建探测器
    pub fn new(selectors: Vec<String>) -> Self {
        Self {
            script: build_probe_script(&selectors),
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// 在当前页面上执行一次探测
    pub async fn probe<S: RenderSession + ?Sized>(
        &self,
        session: &mut S,
    ) -> Result<AdvanceDecision, BrowserError> {
        let value = session.evaluate(&self.script).await?;
        let report: ProbeReport = serde_json::from_value(value.clone())
            .map_err(|_| BrowserError::UnexpectedResult(value.to_string()))?;
        debug!("探测结果: {:?}", report);

        let decision = match (report.status, report.selector) {
            (ProbeStatus::Missing, _) => AdvanceDecision::NoControl,
            (ProbeStatus::Advanced, Some(selector)) => AdvanceDecision::Advanced { selector },
            (ProbeStatus::Disabled, Some(selector)) => AdvanceDecision::Disabled { selector },
            (_, None) => return Err(BrowserError::UnexpectedResult(value.to_string())),
        };
        Ok(decision)
    }
}

fn build_probe_script(selectors: &[String]) -> String {
    // Vec<String> 序列化不会失败
    let list = serde_json::to_string(selectors).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(function() {{
    const selectors = {list};
    let btn = null;
    let matched = null;
    for (const selector of selectors) {{
        let el = null;
        try {{
            el = document.querySelector(selector);
        }} catch (e) {{
            el = null;
        }}
        if (el) {{
            btn = el;
            matched = selector;
            break;
        }}
    }}
    if (!btn) {{
        return {{ status: 'missing', selector: null }};
    }}
    if (btn.classList.contains('disabled') || btn.getAttribute('aria-disabled') === 'true') {{
        return {{ status: 'disabled', selector: matched }};
    }}
    btn.click();
    return {{ status: 'advanced', selector: matched }};
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::ScriptedSession;
    use serde_json::json;

    fn probe() -> NextControlProbe {
        NextControlProbe::new(vec!["#next".to_string(), ".next-button".to_string()])
    }

    #[test]
    fn test_script_embeds_selectors_in_priority_order() {
        let probe = NextControlProbe::new(vec![
            "#next".to_string(),
            r#"[aria-label*="next" i]"#.to_string(),
        ]);
        assert!(probe
            .script()
            .contains(r##"const selectors = ["#next","[aria-label*=\"next\" i]"];"##));
        assert!(probe.script().contains("aria-disabled"));
        assert!(probe.script().contains("btn.click()"));
    }

    #[tokio::test]
    async fn test_advanced_report() {
        let mut session = ScriptedSession::with_evaluations(vec![Ok(
            json!({"status": "advanced", "selector": ".next-button"}),
        )]);
        let decision = probe().probe(&mut session).await.unwrap();
        assert_eq!(
            decision,
            AdvanceDecision::Advanced {
                selector: ".next-button".to_string()
            }
        );
        assert!(!decision.is_stop());
    }

    #[tokio::test]
    async fn test_disabled_and_missing_stop() {
        let mut session = ScriptedSession::with_evaluations(vec![
            Ok(json!({"status": "disabled", "selector": "#next"})),
            Ok(json!({"status": "missing", "selector": null})),
        ]);
        let disabled = probe().probe(&mut session).await.unwrap();
        assert!(disabled.is_stop());
        let missing = probe().probe(&mut session).await.unwrap();
        assert_eq!(missing, AdvanceDecision::NoControl);
        assert!(missing.is_stop());
    }

    #[tokio::test]
    async fn test_unexpected_result_is_error() {
        let mut session = ScriptedSession::with_evaluations(vec![Ok(json!(true))]);
        let err = probe().probe(&mut session).await.unwrap_err();
        assert!(matches!(err, BrowserError::UnexpectedResult(_)));
    }

    #[tokio::test]
    async fn test_script_error_propagates() {
        let mut session =
            ScriptedSession::with_evaluations(vec![Err(BrowserError::script("context destroyed"))]);
        let err = probe().probe(&mut session).await.unwrap_err();
        assert!(matches!(err, BrowserError::ScriptExecutionFailed { .. }));
    }
}
