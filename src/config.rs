use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

/// 页面选择器配置
///
/// 核心逻辑不关心宿主页面的具体标记结构，全部通过注入的选择器定位元素，
/// 便于针对合成页面做单元测试
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// 成绩表格
    pub table: String,
    /// 表格中的成绩行
    pub item: String,
    /// 折叠面板的开关按钮
    pub toggle: String,
    /// 统计面板（注入的挂件）
    pub container: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            table: ".leistung-table".to_string(),
            item: ".leistung-item".to_string(),
            toggle: ".Accordion__Toggle".to_string(),
            container: ".result-container".to_string(),
        }
    }
}

impl Selectors {
    /// 挂件容器的 class 名（去掉选择器前缀的点号）
    pub fn container_class(&self) -> &str {
        self.container.trim_start_matches('.')
    }

    /// 校验选择器均非空
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("table", &self.table),
            ("item", &self.item),
            ("toggle", &self.toggle),
            ("container", &self.container),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(ConfigError::EmptySelector { name }));
            }
        }
        Ok(())
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL
    pub target_url: String,
    /// 目标标签页标题（优先复用已打开的页面）
    pub target_title: Option<String>,
    /// 是否启动无头浏览器（否则附加到已运行的浏览器）
    pub headless: bool,
    /// 浏览器可执行文件路径（无头模式下可选）
    pub browser_executable: Option<String>,
    /// 信号轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 折叠动画的沉降延迟（毫秒）
    pub settle_delay_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 页面选择器
    pub selectors: Selectors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://uspace.univie.ac.at/web/studium/leistungen".to_string(),
            target_title: Some("Leistungen".to_string()),
            headless: false,
            browser_executable: None,
            poll_interval_ms: 250,
            settle_delay_ms: 300,
            verbose_logging: false,
            output_log_file: "overlay.log".to_string(),
            selectors: Selectors::default(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置（缺省值见 `Default`）
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 加载配置：默认值 → `config.toml`（如存在）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let base = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件加载配置
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::File(crate::error::FileError::ReadFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::FileParseFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;
        config.selectors.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(self.target_url),
            target_title: std::env::var("TARGET_TITLE").ok().or(self.target_title),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.headless),
            browser_executable: std::env::var("BROWSER_EXECUTABLE").ok().or(self.browser_executable),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.poll_interval_ms),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.settle_delay_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            selectors: self.selectors,
        }
    }
}
