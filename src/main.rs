use anyhow::{Context, Result};
use course_deck::{utils, App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    utils::init(config.verbose_logging);

    // 初始化并运行应用
    let result = match App::initialize(config).await {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        if e.is_setup_failure() {
            error!("❌ 启动失败，未生成演示文稿: {}", e);
        } else {
            error!("❌ 转换失败: {}", e);
        }
    }
    result.context("课件转换失败")?;

    Ok(())
}
