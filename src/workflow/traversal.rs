//! 页面遍历引擎 - 流程层
//!
//! 核心职责：驱动渲染会话逐页前进，每页截图 + 提取文本后交给文稿组装器
//!
//! 状态流转：
//! 1. Initializing：导航到入口页，等待脚本初始化，隐藏播放器控件
//! 2. Ready → Capturing → Advancing → Ready ...
//! 3. Finished（结束按钮禁用 / 没有下一页按钮 / 到达安全上限）
//!    或 Aborted（截图失败 / 探测脚本执行失败）
//!
//! 整个过程严格串行：同一时刻只有一页在处理，序号只增不减。

use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::deck::SlideSink;
use crate::error::BrowserError;
use crate::infrastructure::RenderSession;
use crate::services::{capture_slide, AdvanceDecision, ControlSuppressor, NextControlProbe};
use crate::utils::{log_slide, truncate_text};
use crate::workflow::SlideCtx;

/// 遍历配置
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// 首次导航后的等待时间
    pub initial_settle: Duration,
    /// 每页截图前的等待时间
    pub slide_settle: Duration,
    /// 安全上限：最多采集的页数
    pub max_slides: u32,
    /// "下一页"选择器，按优先级排列
    pub next_selectors: Vec<String>,
    /// 需要隐藏的控件选择器
    pub hidden_control_selectors: Vec<String>,
}

/// 遍历状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    Initializing,
    Ready,
    Capturing,
    Advancing,
    Finished,
    Aborted,
}

/// 遍历结束原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// 下一页按钮处于禁用状态
    EndControlDisabled { selector: String },
    /// 找不到下一页按钮
    NoNextControl,
    /// 到达安全上限
    SafetyBound,
    /// 截图失败
    ScreenshotFailed(String),
    /// 探测脚本执行失败
    ProbeFailed(String),
}

impl EndReason {
    /// 对应的终止状态
    pub fn terminal_state(&self) -> TraversalState {
        match self {
            EndReason::ScreenshotFailed(_) | EndReason::ProbeFailed(_) => TraversalState::Aborted,
            _ => TraversalState::Finished,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::EndControlDisabled { selector } => write!(f, "下一页按钮已禁用 ({})", selector),
            EndReason::NoNextControl => write!(f, "未找到下一页按钮"),
            EndReason::SafetyBound => write!(f, "已到达页数上限"),
            EndReason::ScreenshotFailed(e) => write!(f, "截图失败: {}", e),
            EndReason::ProbeFailed(e) => write!(f, "下一页探测失败: {}", e),
        }
    }
}

/// 遍历结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalReport {
    pub state: TraversalState,
    pub end: EndReason,
    /// 成功截图的页数
    pub captured: u32,
    /// 成功提交的序号
    pub submitted: Vec<u32>,
    /// 提交失败被丢弃的序号
    pub dropped: Vec<u32>,
}

/// 页面遍历引擎
///
/// - 独占渲染会话与文稿组装器
/// - 只做调度和容错，不关心截图如何编码、文稿如何写出
pub struct TraversalEngine<'a, S: RenderSession + ?Sized, K: SlideSink + ?Sized> {
    session: &'a mut S,
    sink: &'a mut K,
    config: TraversalConfig,
    probe: NextControlProbe,
    suppressor: ControlSuppressor,
    state: TraversalState,
}

impl<'a, S: RenderSession + ?Sized, K: SlideSink + ?Sized> TraversalEngine<'a, S, K> {
    /// 创建新的遍历引擎
    pub fn new(session: &'a mut S, sink: &'a mut K, config: TraversalConfig) -> Self {
        let probe = NextControlProbe::new(config.next_selectors.clone());
        let suppressor = ControlSuppressor::new(&config.hidden_control_selectors);
        Self {
            session,
            sink,
            config,
            probe,
            suppressor,
            state: TraversalState::Initializing,
        }
    }

    /// 从入口页开始遍历到结束
    ///
    /// 只有首次导航失败会返回 `Err`；循环内的致命错误体现在报告的 `Aborted` 状态中
    pub async fn run(mut self, base_url: &str) -> Result<TraversalReport, BrowserError> {
        self.initialize(base_url).await?;

        let mut captured = 0;
        let mut submitted = Vec::new();
        let mut dropped = Vec::new();
        let mut ordinal = 1;

        let end = loop {
            let ctx = SlideCtx::new(ordinal, self.config.max_slides);
            log_slide(&ctx);

            // 等待当前页的过渡动画结束
            sleep(self.config.slide_settle).await;

            // ========== 截图 + 文本 ==========
            self.transition(TraversalState::Capturing);
            let capture = match capture_slide(&mut *self.session, &ctx).await {
                Ok(capture) => capture,
                Err(e) => {
                    error!("{} ❌ 截图失败，停止遍历: {}", ctx, e);
                    break EndReason::ScreenshotFailed(e.to_string());
                }
            };
            captured += 1;
            debug!("{} 文本: {}", ctx, truncate_text(&capture.text, 40));

            // ========== 提交到文稿 ==========
            match self.sink.submit(&capture) {
                Ok(()) => {
                    debug!("{} ✓ 已提交", ctx);
                    submitted.push(ordinal);
                }
                Err(e) => {
                    warn!("{} ⚠️ 添加幻灯片失败，跳过本页: {}", ctx, e);
                    dropped.push(ordinal);
                }
            }

            // ========== 前进判断 ==========
            self.transition(TraversalState::Advancing);
            match self.probe.probe(&mut *self.session).await {
                Ok(AdvanceDecision::Advanced { selector }) => {
                    debug!("{} 已点击下一页: {}", ctx, selector);
                }
                Ok(AdvanceDecision::Disabled { selector }) => {
                    break EndReason::EndControlDisabled { selector };
                }
                Ok(AdvanceDecision::NoControl) => break EndReason::NoNextControl,
                Err(e) => {
                    error!("{} ❌ 无法检查下一页按钮: {}", ctx, e);
                    break EndReason::ProbeFailed(e.to_string());
                }
            }

            if ctx.at_bound() {
                warn!("{} ⚠️ 已到达页数上限，停止遍历", ctx);
                break EndReason::SafetyBound;
            }

            ordinal += 1;
            self.transition(TraversalState::Ready);
        };

        self.transition(end.terminal_state());
        log_traversal_end(&end, captured);

        Ok(TraversalReport {
            state: self.state,
            end,
            captured,
            submitted,
            dropped,
        })
    }

    async fn initialize(&mut self, base_url: &str) -> Result<(), BrowserError> {
        self.transition(TraversalState::Initializing);
        info!("🧭 正在打开课件: {}", base_url);

        if let Err(e) = self.session.navigate(base_url).await {
            error!("导航失败: {}", e);
            self.transition(TraversalState::Aborted);
            return Err(e);
        }

        // 等待课件脚本初始化
        sleep(self.config.initial_settle).await;

        if let Err(e) = self.suppressor.suppress(&mut *self.session).await {
            warn!("⚠️ 无法隐藏播放器控件: {}", e);
        }

        self.transition(TraversalState::Ready);
        Ok(())
    }

    fn transition(&mut self, next: TraversalState) {
        debug!("状态: {:?} → {:?}", self.state, next);
        self.state = next;
    }
}

// ========== 日志辅助函数 ==========

fn log_traversal_end(end: &EndReason, captured: u32) {
    match end.terminal_state() {
        TraversalState::Aborted => error!("❌ 遍历中止: {} (已采集 {} 页)", end, captured),
        _ => info!("🏁 遍历结束: {} (共采集 {} 页)", end, captured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeckError;
    use crate::infrastructure::fake::ScriptedSession;
    use crate::services::SlideCapture;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        ordinals: Vec<u32>,
    }

    impl SlideSink for RecordingSink {
        fn submit(&mut self, capture: &SlideCapture) -> Result<(), DeckError> {
            self.ordinals.push(capture.ordinal);
            Ok(())
        }
    }

    fn config(max_slides: u32) -> TraversalConfig {
        TraversalConfig {
            initial_settle: Duration::ZERO,
            slide_settle: Duration::ZERO,
            max_slides,
            next_selectors: vec!["#next".to_string()],
            hidden_control_selectors: vec![".cs-controls".to_string()],
        }
    }

    #[tokio::test]
    async fn test_stops_on_disabled_control() {
        // 隐藏控件, 文本, 探测(前进), 文本, 探测(禁用)
        let mut session = ScriptedSession::with_evaluations(vec![
            Ok(json!(true)),
            Ok(json!("Page 1")),
            Ok(json!({"status": "advanced", "selector": "#next"})),
            Ok(json!("Page 2")),
            Ok(json!({"status": "disabled", "selector": "#next"})),
        ]);
        let mut sink = RecordingSink::default();

        let report = TraversalEngine::new(&mut session, &mut sink, config(100))
            .run("http://127.0.0.1:1/story.html")
            .await
            .unwrap();

        assert_eq!(report.state, TraversalState::Finished);
        assert_eq!(
            report.end,
            EndReason::EndControlDisabled {
                selector: "#next".to_string()
            }
        );
        assert_eq!(report.submitted, vec![1, 2]);
        assert_eq!(sink.ordinals, vec![1, 2]);
        assert_eq!(session.navigations, vec!["http://127.0.0.1:1/story.html"]);
    }

    #[tokio::test]
    async fn test_probe_error_aborts() {
        let mut session = ScriptedSession::with_evaluations(vec![
            Ok(json!(true)),
            Ok(json!("Page 1")),
            Err(BrowserError::script("execution context was destroyed")),
        ]);
        let mut sink = RecordingSink::default();

        let report = TraversalEngine::new(&mut session, &mut sink, config(100))
            .run("http://127.0.0.1:1/story.html")
            .await
            .unwrap();

        assert_eq!(report.state, TraversalState::Aborted);
        assert!(matches!(report.end, EndReason::ProbeFailed(_)));
        assert_eq!(report.captured, 1);
        assert_eq!(sink.ordinals, vec![1]);
    }

    #[tokio::test]
    async fn test_safety_bound_terminates() {
        // 探测永远返回"已前进"：隐藏控件之后每页两次调用（文本 + 探测）
        let mut evaluations = vec![Ok(json!(true))];
        for _ in 0..10 {
            evaluations.push(Ok(json!("loop")));
            evaluations.push(Ok(json!({"status": "advanced", "selector": "#next"})));
        }
        let mut session = ScriptedSession::with_evaluations(evaluations);
        let mut sink = RecordingSink::default();

        let report = TraversalEngine::new(&mut session, &mut sink, config(3))
            .run("http://127.0.0.1:1/story.html")
            .await
            .unwrap();

        assert_eq!(report.end, EndReason::SafetyBound);
        assert_eq!(report.state, TraversalState::Finished);
        assert_eq!(sink.ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_end_reason_terminal_state() {
        assert_eq!(EndReason::NoNextControl.terminal_state(), TraversalState::Finished);
        assert_eq!(
            EndReason::ScreenshotFailed("x".to_string()).terminal_state(),
            TraversalState::Aborted
        );
    }
}
