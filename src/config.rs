use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::deck::DeckLayout;
use crate::error::ConfigError;
use crate::workflow::TraversalConfig;

/// 可选的配置文件（位于工作目录）
pub const CONFIG_FILE_NAME: &str = "course_deck.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 存放课件镜像的目录
    pub content_dir: PathBuf,
    /// 课件包扩展名（不含点，大小写不敏感）
    pub package_extension: String,
    /// 解包与临时图片使用的目录
    pub scratch_dir: PathBuf,
    /// 输出的演示文稿路径
    pub output_path: PathBuf,
    /// 课件入口页面
    pub entry_page: String,
    /// 浏览器视口宽度
    pub viewport_width: u32,
    /// 浏览器视口高度
    pub viewport_height: u32,
    /// 浏览器可执行文件（为空时由 chromiumoxide 自动探测）
    pub chrome_executable: Option<PathBuf>,
    /// 首次导航后的等待时间（毫秒）
    pub initial_settle_ms: u64,
    /// 每页截图前的等待时间（毫秒）
    pub slide_settle_ms: u64,
    /// 最多处理的幻灯片数量
    pub max_slides: u32,
    /// JPEG 重新编码质量
    pub jpeg_quality: u8,
    /// "下一页"按钮选择器，按优先级排列
    pub next_selectors: Vec<String>,
    /// 截图前需要隐藏的播放器控件
    pub hidden_control_selectors: Vec<String>,
    /// 文本框前缀
    pub caption_prefix: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("../content"),
            package_extension: "iso".to_string(),
            scratch_dir: PathBuf::from("temp_extracted"),
            output_path: PathBuf::from("../output.pptx"),
            entry_page: "story.html".to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            chrome_executable: None,
            initial_settle_ms: 5000,
            slide_settle_ms: 2000,
            max_slides: 100,
            jpeg_quality: 90,
            next_selectors: vec![
                "#next".to_string(),
                ".next-button".to_string(),
                r#"[aria-label*="next" i]"#.to_string(),
            ],
            hidden_control_selectors: vec![
                ".controls-group".to_string(),
                ".cs-controls".to_string(),
                ".area-primary".to_string(),
            ],
            caption_prefix: "Extracted Text: ".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 工作目录下的 TOML 文件（若存在）→ 环境变量
    ///
    /// 配置文件和环境变量都是可选的覆盖层；两者都不存在时，
    /// 行为与固定常量完全一致（`../content`、`temp_extracted`、`../output.pptx` 等）。
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE_NAME);
        let base = if path.exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("CONTENT_DIR") {
            self.content_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SCRATCH_DIR") {
            self.scratch_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("OUTPUT_PATH") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ENTRY_PAGE") {
            self.entry_page = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(PathBuf::from(v));
        }
        self.initial_settle_ms = parse_var(&lookup, "INITIAL_SETTLE_MS", "u64")?.unwrap_or(self.initial_settle_ms);
        self.slide_settle_ms = parse_var(&lookup, "SLIDE_SETTLE_MS", "u64")?.unwrap_or(self.slide_settle_ms);
        self.max_slides = parse_var(&lookup, "MAX_SLIDES", "u32")?.unwrap_or(self.max_slides);
        self.verbose_logging = parse_var(&lookup, "VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging);
        Ok(self)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slides == 0 {
            return Err(invalid("max_slides", "必须大于 0"));
        }
        if self.next_selectors.is_empty() {
            return Err(invalid("next_selectors", "至少需要一个选择器"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(invalid("jpeg_quality", "取值范围为 1-100"));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(invalid("viewport", "宽高必须大于 0"));
        }
        Ok(())
    }

    /// 遍历引擎使用的配置
    pub fn traversal(&self) -> TraversalConfig {
        TraversalConfig {
            initial_settle: Duration::from_millis(self.initial_settle_ms),
            slide_settle: Duration::from_millis(self.slide_settle_ms),
            max_slides: self.max_slides,
            next_selectors: self.next_selectors.clone(),
            hidden_control_selectors: self.hidden_control_selectors.clone(),
        }
    }

    /// 文稿排版配置
    pub fn deck_layout(&self) -> DeckLayout {
        DeckLayout {
            jpeg_quality: self.jpeg_quality,
            caption_prefix: self.caption_prefix.clone(),
            ..DeckLayout::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
