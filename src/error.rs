use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 页面脚本执行错误
    Script(ScriptError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Script(e) => write!(f, "脚本错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Script(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    ConfigurationFailed { message: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "浏览器配置失败: {}", message)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::ConfigurationFailed { .. } => None,
        }
    }
}

/// 页面脚本执行错误
#[derive(Debug)]
pub enum ScriptError {
    /// JS 执行失败
    EvalFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回值解析失败
    ResultParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面脚本自身报错（snippet 内部 catch 到的异常）
    PageException { message: String },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::EvalFailed { source } => write!(f, "JS 执行失败: {}", source),
            ScriptError::ResultParseFailed { source } => {
                write!(f, "JS 返回值解析失败: {}", source)
            }
            ScriptError::PageException { message } => {
                write!(f, "页面脚本异常: {}", message)
            }
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::EvalFailed { source } | ScriptError::ResultParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ScriptError::PageException { .. } => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 选择器为空
    EmptySelector { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
            ConfigError::EmptySelector { name } => {
                write!(f, "选择器 {} 不能为空", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConfigError::EmptySelector { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Script(ScriptError::EvalFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Script(ScriptError::ResultParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建页面创建错误
    pub fn page_creation_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(source),
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建页面脚本异常错误
    pub fn page_exception(message: impl Into<String>) -> Self {
        AppError::Script(ScriptError::PageException {
            message: message.into(),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
