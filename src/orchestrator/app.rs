//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源获取和生命周期管理。
//!
//! 1. **应用初始化**：启动日志文件、连接（或启动）浏览器、创建 JsExecutor
//! 2. **资源管理**：唯一持有 Browser 和 JsExecutor 的模块
//! 3. **向下委托**：把观察和重算全部委托给 WatchLoop

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::orchestrator::watch_loop::WatchLoop;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.selectors.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        // 获取浏览器和成绩页面
        let (browser, page) = if config.headless {
            browser::launch_headless_browser(
                &config.target_url,
                config.browser_executable.as_deref(),
            )
            .await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
                config.target_title.as_deref(),
            )
            .await?
        };

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行应用主逻辑：持续观察页面直到退出
    pub async fn run(&self) -> Result<()> {
        let mut watch_loop = WatchLoop::new(&self.config);
        watch_loop.run(&self.executor).await?;

        info!("日志已保存至: {}", self.config.output_log_file);
        Ok(())
    }
}
