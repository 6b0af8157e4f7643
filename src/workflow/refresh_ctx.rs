//! 重算上下文
//!
//! 封装"这是第几次重算、由什么触发"这一信息，只用于日志显示

use std::fmt::Display;

/// 触发一次重算的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 程序启动时的首次计算
    Startup,
    /// 探测阶段发现节点增删（表格可能出现了）
    Structure,
    /// 折叠开关交互（沉降延迟后）
    Toggle,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Startup => "启动",
            Trigger::Structure => "结构变化",
            Trigger::Toggle => "折叠开关",
        }
    }
}

/// 重算上下文
#[derive(Debug, Clone, Copy)]
pub struct RefreshCtx {
    /// 重算序号（从 1 开始，仅用于日志显示）
    pub pass_index: usize,
    /// 触发原因
    pub trigger: Trigger,
}

impl RefreshCtx {
    pub fn new(pass_index: usize, trigger: Trigger) -> Self {
        Self {
            pass_index,
            trigger,
        }
    }
}

impl Display for RefreshCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[第 {} 次重算 | 触发: {}]", self.pass_index, self.trigger.name())
    }
}
