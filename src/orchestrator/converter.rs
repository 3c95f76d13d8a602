//! 课件转换器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：定位课件包、解包、启动内容服务、启动无头浏览器
//! 2. **遍历**：委托 `TraversalEngine` 逐页截图，交给 `DeckAssembler`
//! 3. **资源管理**：结束或中止后逆序释放，再写出演示文稿
//! 4. **全局统计**：输出本次转换的结果

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::browser::{launch_headless_browser, BrowserHandle, LaunchOptions};
use crate::config::Config;
use crate::deck::DeckAssembler;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{JsExecutor, RenderSession};
use crate::package::{extract_iso, find_course_package, ScratchDir};
use crate::server::ContentServer;
use crate::utils::{log_startup, print_final_stats};
use crate::workflow::{TraversalEngine, TraversalReport};

/// 已就绪的课件内容：课件包、临时目录和正在运行的内容服务
pub struct PreparedContent {
    package: PathBuf,
    scratch: ScratchDir,
    server: ContentServer,
}

impl PreparedContent {
    /// 定位课件包、解包并启动内容服务
    ///
    /// 找不到课件包时不会创建临时目录
    pub async fn prepare(config: &Config) -> AppResult<Self> {
        let package = find_course_package(&config.content_dir, &config.package_extension)?;

        let scratch = ScratchDir::create(&config.scratch_dir)?;
        extract_iso(&package, &scratch.content_dir()).await?;

        let server = ContentServer::start(scratch.content_dir()).await?;

        Ok(Self {
            package,
            scratch,
            server,
        })
    }

    /// 内容服务监听的地址
    pub fn server_addr(&self) -> SocketAddr {
        self.server.addr()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    content: PreparedContent,
    browser: BrowserHandle,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    ///
    /// 任一步失败都会释放已获取的资源后返回错误，此时不会产生任何输出
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let content = PreparedContent::prepare(&config).await?;

        let options = LaunchOptions {
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chrome_executable: config.chrome_executable.clone(),
        };
        let (browser, page) = match launch_headless_browser(&options).await {
            Ok(launched) => launched,
            Err(e) => {
                stop_server(content.server).await;
                return Err(e.into());
            }
        };

        Ok(Self {
            config,
            content,
            browser,
            executor: JsExecutor::new(page),
        })
    }

    /// 运行转换主逻辑
    pub async fn run(self) -> AppResult<TraversalReport> {
        run_conversion(&self.config, self.content, self.executor, Some(self.browser)).await
    }
}

/// 在给定的渲染会话上遍历课件，然后逆序释放资源并写出演示文稿
///
/// 释放顺序：渲染会话（及浏览器）→ 内容服务 → 临时目录 → 写出文稿。
/// 遍历中止时同样会写出已采集的幻灯片；只有入口页打不开时不写出。
pub async fn run_conversion<S: RenderSession>(
    config: &Config,
    content: PreparedContent,
    mut session: S,
    browser: Option<BrowserHandle>,
) -> AppResult<TraversalReport> {
    let PreparedContent {
        package,
        scratch,
        server,
    } = content;

    let mut assembler =
        DeckAssembler::new(config.deck_layout(), scratch.slides_dir()).with_title(deck_title(&package));
    let entry_url = server.entry_url(&config.entry_page);

    let traversal = TraversalEngine::new(&mut session, &mut assembler, config.traversal())
        .run(&entry_url)
        .await;

    drop(session);
    if let Some(browser) = browser {
        browser.close().await;
    }
    stop_server(server).await;
    if let Err(e) = scratch.remove() {
        warn!("⚠️ 删除临时目录失败: {}", e);
    }

    // 入口页打不开属于启动失败，不写出文稿
    let report = traversal?;

    let saved = match assembler.persist(&config.output_path) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("❌ 写出演示文稿失败: {}", e);
            Err(e)
        }
    };
    print_final_stats(&report, &config.output_path, saved.is_ok());
    saved?;

    Ok(report)
}

/// 以课件包文件名作为演示文稿标题
fn deck_title(package: &Path) -> String {
    package
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Course".to_string())
}

async fn stop_server(server: ContentServer) {
    if let Err(e) = server.shutdown().await {
        warn!("⚠️ {}", AppError::from(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackageError;

    #[test]
    fn test_deck_title_uses_file_stem() {
        assert_eq!(deck_title(Path::new("../content/Safety Module.iso")), "Safety Module");
    }

    #[tokio::test]
    async fn test_missing_package_fails_before_scratch() {
        let content = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let config = Config {
            content_dir: content.path().to_path_buf(),
            scratch_dir: work.path().join("temp_extracted"),
            output_path: work.path().join("output.pptx"),
            ..Config::default()
        };

        let err = match App::initialize(config).await {
            Ok(_) => panic!("没有课件包时不应初始化成功"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Package(PackageError::NotFound { .. })));
        assert!(err.is_setup_failure());
        assert!(!work.path().join("temp_extracted").exists());
        assert!(!work.path().join("output.pptx").exists());
    }
}
