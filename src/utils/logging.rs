//! 日志工具模块
//!
//! 提供 tracing 初始化和运行日志文件的辅助函数

use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 初始化 tracing 日志
///
/// 默认级别 info，可用 RUST_LOG 覆盖（如 RUST_LOG=grade_summary_overlay=debug）；
/// 重复调用（比如多个测试共用一个进程）时静默忽略
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化运行日志文件（写入带时间戳的文件头）
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n成绩统计日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 成绩页面观察模式");
    if config.headless {
        info!("🖥 无头浏览器: {}", config.target_url);
    } else {
        info!("🔌 附加到浏览器端口: {}", config.browser_debug_port);
    }
    info!("📊 表格选择器: {}", config.selectors.table);
    info!(
        "⏲ 轮询间隔: {} 毫秒, 沉降延迟: {} 毫秒",
        config.poll_interval_ms, config.settle_delay_ms
    );
    info!("{}", "=".repeat(60));
}
