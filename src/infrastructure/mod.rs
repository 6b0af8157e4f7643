//! 基础设施层（Infrastructure Layer）
//!
//! 持有稀缺资源（Page），只暴露能力，不认识业务概念

pub mod js_executor;

pub use js_executor::JsExecutor;
