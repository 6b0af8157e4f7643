//! # Grade Summary Overlay
//!
//! 一个观察大学成绩页面并注入统计挂件的 Rust 应用程序
//!
//! 通过 DevTools 协议附加到正在运行的浏览器，等待宿主页面异步渲染出
//! 成绩表格，把每行的学分和成绩解析成记录，计算加权平均分、GPA、
//! 总学分、课程数和挂科数，并在表格前插入（之后原地更新）一个统计挂件。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力一个文件
//! - `PageObserver` - 页面变化感知能力（两阶段观察器 + 信号队列）
//! - `TableExtractor` - 表格读取与行解析能力
//! - `stats_aggregator` - 统计折叠能力（纯函数）
//! - `WidgetPresenter` - 挂件创建/原地更新能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次重算"的完整流程
//! - `RefreshCtx` - 上下文封装（序号 + 触发原因）
//! - `RefreshFlow` - 流程编排（提取 → 聚合 → 渲染）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期，管理浏览器资源
//! - `orchestrator/watch_loop` - 观察循环，决定何时重算

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::{Config, Selectors};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{Grade, GradeRecord, SummaryStats};
pub use orchestrator::{App, WatchLoop, WatchPhase};
pub use workflow::{RefreshCtx, RefreshFlow, RefreshOutcome, Trigger};
