use std::path::PathBuf;

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 课件包定位 / 解包错误
    #[error("课件包错误: {0}")]
    Package(#[from] PackageError),
    /// 本地内容服务错误
    #[error("内容服务错误: {0}")]
    Server(#[from] ServerError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文稿组装错误
    #[error("文稿错误: {0}")]
    Deck(#[from] DeckError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 是否属于"启动阶段致命错误"（尚未产出任何幻灯片）
    pub fn is_setup_failure(&self) -> bool {
        match self {
            AppError::Package(_) | AppError::Server(_) | AppError::Config(_) => true,
            AppError::Browser(e) => matches!(
                e,
                BrowserError::LaunchFailed { .. } | BrowserError::NavigationFailed { .. }
            ),
            AppError::Deck(_) => false,
        }
    }
}

/// 课件包错误
#[derive(Debug, Error)]
pub enum PackageError {
    /// 内容目录中没有课件包
    #[error("在 {} 中没有找到 .{extension} 课件包", dir.display())]
    NotFound { dir: PathBuf, extension: String },
    /// 遍历内容目录失败
    #[error("遍历目录失败 ({}): {source}", dir.display())]
    WalkFailed {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    /// 打开镜像文件失败
    #[error("无法打开镜像 ({}): {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// ISO 9660 解析失败
    #[error("无法读取 ISO 镜像 ({}): {source}", path.display())]
    IsoReadFailed {
        path: PathBuf,
        #[source]
        source: cdfs::ISOError,
    },
    /// 写出解包文件失败
    #[error("写入解包文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 临时目录创建 / 删除失败
    #[error("临时目录操作失败 ({}): {source}", path.display())]
    ScratchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 解包任务异常退出
    #[error("解包任务异常退出: {0}")]
    TaskFailed(String),
}

/// 本地内容服务错误
#[derive(Debug, Error)]
pub enum ServerError {
    /// 绑定回环端口失败
    #[error("绑定回环端口失败: {0}")]
    BindFailed(#[source] std::io::Error),
    /// 服务运行失败
    #[error("HTTP 服务运行失败: {0}")]
    ServeFailed(#[source] std::io::Error),
    /// 关闭超时或任务异常
    #[error("HTTP 服务关闭失败: {0}")]
    ShutdownFailed(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: BoxError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: BoxError,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: BoxError,
    },
    /// 截图失败
    #[error("截图失败: {source}")]
    ScreenshotFailed {
        #[source]
        source: BoxError,
    },
    /// 脚本返回了无法识别的结果
    #[error("脚本返回值无法解析: {0}")]
    UnexpectedResult(String),
}

impl BrowserError {
    /// 创建脚本执行错误
    pub fn script(source: impl Into<BoxError>) -> Self {
        BrowserError::ScriptExecutionFailed {
            source: source.into(),
        }
    }

    /// 创建截图错误
    pub fn screenshot(source: impl Into<BoxError>) -> Self {
        BrowserError::ScreenshotFailed {
            source: source.into(),
        }
    }

    /// 创建导航错误
    pub fn navigation(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        BrowserError::NavigationFailed {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// 文稿组装错误
#[derive(Debug, Error)]
pub enum DeckError {
    /// 截图解码失败
    #[error("截图解码失败 (幻灯片 {ordinal}): {source}")]
    DecodeFailed {
        ordinal: u32,
        #[source]
        source: image::ImageError,
    },
    /// 重新编码失败
    #[error("JPEG 编码失败 ({}): {source}", path.display())]
    EncodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// 编码后的图片校验失败
    #[error("图片校验失败 ({}): {source}", path.display())]
    VerifyFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// 图片尺寸无效
    #[error("图片尺寸无效 ({}): {width}x{height}", path.display())]
    InvalidSize {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// 文件读写失败
    #[error("文件操作失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写出 pptx 压缩包失败
    #[error("写入演示文稿失败 ({}): {source}", path.display())]
    ArchiveFailed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    Invalid { field: String, reason: String },
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failure_classification() {
        let not_found = AppError::from(PackageError::NotFound {
            dir: PathBuf::from("../content"),
            extension: "iso".to_string(),
        });
        assert!(not_found.is_setup_failure());

        let nav = AppError::from(BrowserError::navigation("http://127.0.0.1:1/story.html", "refused"));
        assert!(nav.is_setup_failure());

        // 循环内的截图失败不属于启动阶段错误
        let shot = AppError::from(BrowserError::screenshot("target closed"));
        assert!(!shot.is_setup_failure());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = PackageError::NotFound {
            dir: PathBuf::from("content"),
            extension: "iso".to_string(),
        };
        assert_eq!(err.to_string(), "在 content 中没有找到 .iso 课件包");

        let err = BrowserError::script("boom");
        assert!(err.to_string().contains("boom"));
    }
}
