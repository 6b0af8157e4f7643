use anyhow::Result;

use grade_summary_overlay::orchestrator::App;
use grade_summary_overlay::utils::logging;
use grade_summary_overlay::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（默认值 → config.toml → 环境变量）
    let config = Config::load()?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
