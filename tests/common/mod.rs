//! 集成测试共用的模拟课件

#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use course_deck::error::{BrowserError, DeckError};
use course_deck::{RenderSession, SlideCapture, SlideSink, TraversalConfig};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value as JsonValue};

/// 模拟课件中的一页
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub text: String,
    /// 页面上存在的"下一页"选择器
    pub controls: Vec<String>,
    /// 其中处于禁用状态的选择器
    pub disabled: HashSet<String>,
}

impl FakePage {
    pub fn with_next(text: &str, selector: &str) -> Self {
        Self {
            text: text.to_string(),
            controls: vec![selector.to_string()],
            disabled: HashSet::new(),
        }
    }

    pub fn last(text: &str, selector: &str) -> Self {
        Self {
            text: text.to_string(),
            controls: vec![selector.to_string()],
            disabled: [selector.to_string()].into(),
        }
    }

    pub fn bare(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// 按页面脚本行为模拟课件播放器的渲染会话
///
/// 只识别三类脚本：隐藏控件、读取 innerText、下一页探测
pub struct FakeCourse {
    pages: Vec<FakePage>,
    current: usize,
    /// 为 true 时最后一页之后回到第一页，用于测试安全上限
    pub wrap_around: bool,
    /// 第 n 次截图（从 1 开始）失败
    pub fail_screenshot_at: Option<usize>,
    /// 第 n 次探测（从 1 开始）失败
    pub fail_probe_at: Option<usize>,
    /// 读取文本总是失败
    pub fail_text: bool,
    pub screenshots_taken: usize,
    pub probes_run: usize,
    pub suppressed: bool,
    pub navigations: Vec<String>,
}

impl FakeCourse {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            current: 0,
            wrap_around: false,
            fail_screenshot_at: None,
            fail_probe_at: None,
            fail_text: false,
            screenshots_taken: 0,
            probes_run: 0,
            suppressed: false,
            navigations: Vec::new(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    fn probe(&mut self, script: &str) -> Result<JsonValue, BrowserError> {
        self.probes_run += 1;
        if self.fail_probe_at == Some(self.probes_run) {
            return Err(BrowserError::script("execution context was destroyed"));
        }

        let selectors = parse_selectors(script)?;
        let page = &self.pages[self.current];
        let Some(matched) = selectors.iter().find(|s| page.controls.contains(s)).cloned() else {
            return Ok(json!({"status": "missing", "selector": null}));
        };
        if page.disabled.contains(&matched) {
            return Ok(json!({"status": "disabled", "selector": matched}));
        }

        self.current += 1;
        if self.current == self.pages.len() {
            self.current = if self.wrap_around { 0 } else { self.pages.len() - 1 };
        }
        Ok(json!({"status": "advanced", "selector": matched}))
    }
}

#[async_trait]
impl RenderSession for FakeCourse {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations.push(url.to_string());
        self.current = 0;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, BrowserError> {
        if script.contains("const selectors = ") {
            return self.probe(script);
        }
        if script.contains("innerText") {
            if self.fail_text {
                return Err(BrowserError::script("document is not ready"));
            }
            return Ok(json!(self.pages[self.current].text));
        }
        if script.contains("data-course-deck") {
            self.suppressed = true;
            return Ok(json!(true));
        }
        Ok(JsonValue::Null)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        self.screenshots_taken += 1;
        if self.fail_screenshot_at == Some(self.screenshots_taken) {
            return Err(BrowserError::screenshot("target closed"));
        }
        Ok(page_png(self.current))
    }
}

/// 从探测脚本中取出选择器列表
fn parse_selectors(script: &str) -> Result<Vec<String>, BrowserError> {
    let line = script
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("const selectors = "))
        .ok_or_else(|| BrowserError::UnexpectedResult(script.to_string()))?;
    serde_json::from_str(line.trim_end_matches(';')).map_err(BrowserError::script)
}

/// 每页一张不同颜色的 PNG
pub fn page_png(index: usize) -> Vec<u8> {
    let shade = (index * 40 % 256) as u8;
    let img = RgbImage::from_pixel(64, 36, Rgb([shade, 120, 255 - shade]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("PNG 编码失败");
    out.into_inner()
}

/// 记录提交内容的接收端，可指定某些序号提交失败
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub accepted: Vec<(u32, String)>,
    pub reject: HashSet<u32>,
}

impl SlideSink for RecordingSink {
    fn submit(&mut self, capture: &SlideCapture) -> Result<(), DeckError> {
        if self.reject.contains(&capture.ordinal) {
            return Err(DeckError::DecodeFailed {
                ordinal: capture.ordinal,
                source: image::ImageError::IoError(std::io::Error::other("rejected")),
            });
        }
        self.accepted.push((capture.ordinal, capture.text.clone()));
        Ok(())
    }
}

impl RecordingSink {
    pub fn ordinals(&self) -> Vec<u32> {
        self.accepted.iter().map(|(n, _)| *n).collect()
    }
}

pub fn fast_config(max_slides: u32) -> TraversalConfig {
    TraversalConfig {
        initial_settle: Duration::ZERO,
        slide_settle: Duration::ZERO,
        max_slides,
        next_selectors: vec![
            "#next".to_string(),
            ".next-button".to_string(),
            r#"[aria-label*="next" i]"#.to_string(),
        ],
        hidden_control_selectors: vec![".controls-group".to_string(), ".cs-controls".to_string()],
    }
}

/// 发送一个最简单的 HTTP GET，返回完整响应文本
pub async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

/// 测试用课件镜像：STORY.HTML;1 与 HTML5/DATA.JS;1
pub fn fixture_iso() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/course.iso")
}
