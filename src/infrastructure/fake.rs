//! 单元测试用的脚本化会话

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::BrowserError;
use crate::infrastructure::RenderSession;

/// 依次返回预设结果的会话，并记录收到的脚本
#[derive(Default)]
pub(crate) struct ScriptedSession {
    pub evaluations: VecDeque<Result<JsonValue, BrowserError>>,
    pub screenshots: VecDeque<Result<Vec<u8>, BrowserError>>,
    pub scripts: Vec<String>,
    pub navigations: Vec<String>,
}

impl ScriptedSession {
    pub fn with_evaluations(results: Vec<Result<JsonValue, BrowserError>>) -> Self {
        Self {
            evaluations: results.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations.push(url.to_string());
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, BrowserError> {
        self.scripts.push(script.to_string());
        self.evaluations
            .pop_front()
            .unwrap_or(Ok(JsonValue::Null))
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        self.screenshots
            .pop_front()
            .unwrap_or_else(|| Ok(vec![0x89, b'P', b'N', b'G']))
    }
}
