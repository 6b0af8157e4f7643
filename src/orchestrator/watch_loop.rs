//! 观察循环 - 编排层
//!
//! ## 职责
//!
//! 本模块是变化检测的"指挥中心"：从页面侧取回原始信号，
//! 决定何时值得重算一次，并在两个观察阶段之间显式切换。
//!
//! ## 两阶段状态机
//!
//! ```text
//! Detecting（探测）──表格出现──▶ Tracking（跟踪）
//!      ▲                              │
//!      └───────表格被宿主移除──────────┘
//! ```
//!
//! - 探测阶段：广域观察整个页面的节点增删，只为发现表格出现
//! - 跟踪阶段：广域观察器已断开，只看折叠开关；开关交互后等一个
//!   沉降延迟再重算，让折叠动画先跑完
//!
//! ## 错误边界
//!
//! 单次 tick 里的任何错误（取信号失败、流水线异常）只记录日志，
//! 循环继续观察，下一次触发时重试

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::services::{PageObserver, Signal, SignalKind};
use crate::workflow::{RefreshCtx, RefreshFlow, RefreshOutcome, Trigger};

/// 观察阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    /// 等待成绩表格出现（广域观察）
    Detecting,
    /// 表格已确认存在，只跟踪折叠开关（窄域观察）
    Tracking,
}

/// 沉降计时器
///
/// 策略是 cancel-and-reschedule：每个新信号都把截止时间重置为
/// "最新信号 + 延迟"，连续快速的开关交互只触发一次重算。
/// 流水线本身是幂等的，这里合并只是为了省掉多余的重复计算
#[derive(Debug)]
pub struct SettleTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// 重置截止时间为 now + delay
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// 截止时间已到时返回 true 并解除武装
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// 观察循环
///
/// - 持有阶段状态和沉降计时器
/// - 委托 PageObserver 管理页面侧观察器
/// - 委托 RefreshFlow 执行具体的重算
pub struct WatchLoop {
    observer: PageObserver,
    flow: RefreshFlow,
    phase: WatchPhase,
    settle: SettleTimer,
    poll_interval: Duration,
    settle_delay: Duration,
    pass_count: usize,
}

impl WatchLoop {
    pub fn new(config: &Config) -> Self {
        let settle_delay = Duration::from_millis(config.settle_delay_ms);
        Self {
            observer: PageObserver::new(config.selectors.clone()),
            flow: RefreshFlow::new(config),
            phase: WatchPhase::Detecting,
            settle: SettleTimer::new(settle_delay),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            settle_delay,
            pass_count: 0,
        }
    }

    /// 当前观察阶段
    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    /// 运行观察循环，直到收到退出信号
    ///
    /// 没有显式的停止契约：观察持续到进程被打断为止
    pub async fn run(&mut self, executor: &JsExecutor) -> Result<()> {
        self.observer.install_presence_watch(executor).await?;

        // 启动时表格可能已经在页面上了，先算一次
        if let Err(e) = self.startup_pass(executor).await {
            error!("❌ 启动计算失败: {}", e);
        }

        info!("👀 开始观察页面 (阶段: {:?})", self.phase);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 收到退出信号，停止观察");
                    break;
                }
                _ = sleep(self.poll_interval) => {}
            }

            if let Err(e) = self.tick(executor).await {
                error!("❌ 处理页面信号时发生错误: {}", e);
            }
        }

        Ok(())
    }

    /// 启动时的首次探测与计算
    async fn startup_pass(&mut self, executor: &JsExecutor) -> Result<()> {
        if self.observer.table_present(executor).await? {
            let outcome = self.run_pass(executor, Trigger::Startup).await?;
            self.apply_outcome(executor, &outcome).await?;
        } else {
            debug!("启动时表格尚未出现，进入探测阶段");
        }
        Ok(())
    }

    /// 处理一个轮询周期
    async fn tick(&mut self, executor: &JsExecutor) -> Result<()> {
        let signals = self.observer.drain_signals(executor).await?;
        let (structure_seen, toggle_seen) = summarize(&signals);
        let now = Instant::now();

        match self.phase {
            WatchPhase::Detecting => {
                // 探测阶段任何信号都只关心一件事：表格出现了没有
                if (structure_seen || toggle_seen)
                    && self.observer.table_present(executor).await?
                {
                    let outcome = self.run_pass(executor, Trigger::Structure).await?;
                    self.apply_outcome(executor, &outcome).await?;
                }
            }
            WatchPhase::Tracking => {
                if toggle_seen {
                    self.settle.arm(now);
                    debug!(
                        "⏲ 折叠开关交互，{} 毫秒后重算",
                        self.settle_delay.as_millis()
                    );
                }
                if self.settle.take_due(now) {
                    let outcome = self.run_pass(executor, Trigger::Toggle).await?;
                    self.apply_outcome(executor, &outcome).await?;
                }
            }
        }

        Ok(())
    }

    /// 执行一次重算
    async fn run_pass(
        &mut self,
        executor: &JsExecutor,
        trigger: Trigger,
    ) -> Result<RefreshOutcome> {
        self.pass_count += 1;
        let ctx = RefreshCtx::new(self.pass_count, trigger);
        self.flow.run(executor, &ctx).await
    }

    /// 根据重算结果切换观察阶段
    async fn apply_outcome(
        &mut self,
        executor: &JsExecutor,
        outcome: &RefreshOutcome,
    ) -> Result<()> {
        match plan_transition(self.phase, outcome) {
            Some(WatchPhase::Tracking) => {
                let toggles = self.observer.switch_to_change_watch(executor).await?;
                self.phase = WatchPhase::Tracking;
                info!("🔭 表格已出现，切换到跟踪阶段 ({} 个折叠开关)", toggles);
            }
            Some(WatchPhase::Detecting) => {
                self.observer.restore_presence_watch(executor).await?;
                self.phase = WatchPhase::Detecting;
                warn!("表格从页面上消失，回到探测阶段等待重新出现");
            }
            None => {}
        }
        Ok(())
    }
}

/// 把一批信号压缩成两个布尔量
fn summarize(signals: &[Signal]) -> (bool, bool) {
    let structure = signals.iter().any(|s| s.kind == SignalKind::Structure);
    let toggle = signals.iter().any(|s| s.kind == SignalKind::Toggle);
    (structure, toggle)
}

/// 阶段切换决策（纯函数，便于测试）
///
/// - 探测阶段里只要重算跑到了表格（无论有没有有效数据），
///   观察范围就可以收窄
/// - 跟踪阶段里发现表格整个没了，就回到探测阶段，
///   等宿主重渲染后重建挂件
fn plan_transition(phase: WatchPhase, outcome: &RefreshOutcome) -> Option<WatchPhase> {
    match (phase, outcome) {
        (WatchPhase::Detecting, RefreshOutcome::Rendered { .. })
        | (WatchPhase::Detecting, RefreshOutcome::NoData)
        | (WatchPhase::Detecting, RefreshOutcome::WidgetStale) => Some(WatchPhase::Tracking),
        (WatchPhase::Tracking, RefreshOutcome::NoTable) => Some(WatchPhase::Detecting),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryStats;

    fn rendered() -> RefreshOutcome {
        RefreshOutcome::Rendered {
            stats: SummaryStats {
                weighted_average: 1.33,
                gpa: 3.67,
                total_credits: 15.0,
                course_count: 2,
                failed_count: 1,
            },
            created: true,
        }
    }

    #[test]
    fn test_settle_timer_rearm_coalesces() {
        let mut timer = SettleTimer::new(Duration::from_millis(300));
        let t0 = Instant::now();

        timer.arm(t0);
        // 200ms 后又来一个信号：截止时间顺延
        timer.arm(t0 + Duration::from_millis(200));

        assert!(!timer.take_due(t0 + Duration::from_millis(300)));
        assert!(timer.take_due(t0 + Duration::from_millis(500)));
        // 触发后解除武装
        assert!(!timer.is_armed());
        assert!(!timer.take_due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_settle_timer_unarmed_never_fires() {
        let mut timer = SettleTimer::new(Duration::from_millis(300));
        assert!(!timer.take_due(Instant::now() + Duration::from_secs(10)));
    }

    #[test]
    fn test_summarize_signals() {
        let signals = vec![
            Signal {
                kind: SignalKind::Toggle,
            },
            Signal {
                kind: SignalKind::Toggle,
            },
        ];
        assert_eq!(summarize(&signals), (false, true));
        assert_eq!(summarize(&[]), (false, false));
    }

    #[test]
    fn test_detecting_switches_to_tracking_once_table_is_processed() {
        assert_eq!(
            plan_transition(WatchPhase::Detecting, &rendered()),
            Some(WatchPhase::Tracking)
        );
        // 表格在但还没有有效数据：观察范围同样可以收窄
        assert_eq!(
            plan_transition(WatchPhase::Detecting, &RefreshOutcome::NoData),
            Some(WatchPhase::Tracking)
        );
        // 表格还没出现：停留在探测阶段
        assert_eq!(
            plan_transition(WatchPhase::Detecting, &RefreshOutcome::NoTable),
            None
        );
    }

    #[test]
    fn test_tracking_falls_back_when_table_vanishes() {
        assert_eq!(
            plan_transition(WatchPhase::Tracking, &RefreshOutcome::NoTable),
            Some(WatchPhase::Detecting)
        );
        // 正常更新：保持跟踪
        assert_eq!(plan_transition(WatchPhase::Tracking, &rendered()), None);
        assert_eq!(
            plan_transition(WatchPhase::Tracking, &RefreshOutcome::NoData),
            None
        );
    }
}
