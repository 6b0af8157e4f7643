//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和触发调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 管理初始化（日志、浏览器、JsExecutor）
//! - 唯一持有 Browser 资源
//!
//! ### `watch_loop` - 观察循环
//! - 两阶段观察状态机（探测 → 跟踪）
//! - 沉降计时与信号合并
//! - 流水线错误边界
//!
//! ## 层次关系
//!
//! ```text
//! app (资源与生命周期)
//!     ↓
//! watch_loop (何时重算)
//!     ↓
//! workflow::RefreshFlow (一次重算)
//!     ↓
//! services (能力层：observe / extract / aggregate / present)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管资源，watch_loop 管时机
//! 2. **资源隔离**：只有编排层持有 Browser 和 JsExecutor
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：不做成绩解析和统计判断

pub mod app;
pub mod watch_loop;

pub use app::App;
pub use watch_loop::{WatchLoop, WatchPhase};
