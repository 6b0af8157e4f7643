use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 启动无头浏览器并导航到指定 URL
///
/// 主要用于本地验证和集成测试：把保存下来的成绩页（file:// 或 data: URL）
/// 喂给完整流水线跑一遍
pub async fn launch_headless_browser(
    url: &str,
    executable: Option<&str>,
) -> AppResult<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}", url);

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
        "--disable-dev-shm-usage", // 防止共享内存不足
        "--remote-debugging-port=0",
    ]);

    // 未指定可执行文件时由 chromiumoxide 自动探测
    if let Some(path) = executable {
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder
        .build()
        .map_err(|message| AppError::Browser(BrowserError::ConfigurationFailed { message }))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(AppError::page_creation_failed)?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 创建新页面并导航
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| AppError::navigation_failed(url, e))?;

    info!("✅ 无头浏览器已导航到: {}", url);

    Ok((browser, page))
}
