use std::path::PathBuf;

use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::BrowserError;

/// 无头浏览器启动参数
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_executable: Option<PathBuf>,
}

/// 浏览器进程及其 CDP 事件处理任务
pub struct BrowserHandle {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserHandle {
    /// 关闭浏览器并等待事件任务结束
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("⚠️ 等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();
        info!("✓ 浏览器已关闭");
    }
}

/// 启动无头浏览器并创建一个空白页面
pub async fn launch_headless_browser(options: &LaunchOptions) -> Result<(BrowserHandle, Page), BrowserError> {
    info!("🚀 启动无头浏览器...");
    debug!(
        "视口: {}x{}, 可执行文件: {:?}",
        options.viewport_width, options.viewport_height, options.chrome_executable
    );

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .window_size(options.viewport_width, options.viewport_height)
        .viewport(Viewport {
            width: options.viewport_width,
            height: options.viewport_height,
            ..Viewport::default()
        })
        .args(vec![
            "--disable-gpu",           // 无头模式下禁用 GPU
            "--no-sandbox",            // 容器内没有沙盒权限
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--hide-scrollbars",
            "--mute-audio",
        ]);
    if let Some(path) = &options.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("创建页面失败: {}", e);
            BrowserHandle {
                browser,
                handler_task,
            }
            .close()
            .await;
            return Err(BrowserError::LaunchFailed {
                source: Box::new(e),
            });
        }
    };

    info!("✅ 无头浏览器已就绪");
    Ok((
        BrowserHandle {
            browser,
            handler_task,
        },
        page,
    ))
}
