//! 流程层（Workflow Layer）
//!
//! 定义"一次重算"的完整流程，不持有资源，不决定何时触发

pub mod refresh_ctx;
pub mod refresh_flow;

pub use refresh_ctx::{RefreshCtx, Trigger};
pub use refresh_flow::{RefreshFlow, RefreshOutcome};
