/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::{SlideCtx, TraversalReport, TraversalState};

/// 初始化日志订阅器
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 课件转演示文稿");
    info!("📁 课件目录: {}", config.content_dir.display());
    info!("📄 输出文件: {}", config.output_path.display());
    info!(
        "⏱️ 等待时间: 首次 {} ms / 每页 {} ms, 上限 {} 页",
        config.initial_settle_ms, config.slide_settle_ms, config.max_slides
    );
    info!("{}", "=".repeat(60));
}

/// 记录单页开始
pub fn log_slide(ctx: &SlideCtx) {
    info!("{}", "─".repeat(30));
    info!("{} 📸 正在处理...", ctx);
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 遍历结果
/// - `output_path`: 演示文稿路径
/// - `saved`: 演示文稿是否写出成功
pub fn print_final_stats(report: &TraversalReport, output_path: &Path, saved: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📊 转换完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match report.state {
        TraversalState::Aborted => error!("❌ 结束原因: {}", report.end),
        _ => info!("🏁 结束原因: {}", report.end),
    }
    info!("📸 已截图: {}", report.captured);
    info!("✅ 已写入: {}", report.submitted.len());
    if !report.dropped.is_empty() {
        warn!("⚠️ 已跳过: {} (序号 {:?})", report.dropped.len(), report.dropped);
    }
    info!("{}", "=".repeat(60));
    if saved {
        info!("\n演示文稿已保存至: {}", output_path.display());
    } else {
        error!("\n演示文稿未能保存: {}", output_path.display());
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
