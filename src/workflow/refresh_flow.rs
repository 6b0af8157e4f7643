//! 重算流程 - 流程层
//!
//! 核心职责：定义"一次重算"的完整流程
//!
//! 流程顺序：
//! 1. 提取：从页面取回行数据并解析成记录
//! 2. 聚合：折叠成汇总统计
//! 3. 渲染：创建或原地更新统计挂件
//!
//! 每一步的"没有数据"都是正常结果而不是错误：直接返回对应的
//! Outcome，等下一次触发再试

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::SummaryStats;
use crate::services::{stats_aggregator, RenderOutcome, TableExtractor, WidgetPresenter};
use crate::workflow::refresh_ctx::RefreshCtx;

/// 一次重算的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// 统计已计算并渲染到挂件
    Rendered {
        stats: SummaryStats,
        /// 本次是否新建了挂件（否则为原地更新）
        created: bool,
    },
    /// 表格不在页面上（还没出现，或宿主把它整个移除了）
    NoTable,
    /// 表格在，但没有任何有效的成绩数据
    NoData,
    /// 挂件被宿主改得面目全非（子节点数不符），按约定不修不碰
    WidgetStale,
}

/// 重算流程
///
/// - 编排提取 → 聚合 → 渲染
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct RefreshFlow {
    extractor: TableExtractor,
    presenter: WidgetPresenter,
    verbose_logging: bool,
}

impl RefreshFlow {
    /// 创建新的重算流程
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: TableExtractor::new(config.selectors.clone()),
            presenter: WidgetPresenter::new(config.selectors.clone()),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 执行一次完整的重算
    pub async fn run(&self, executor: &JsExecutor, ctx: &RefreshCtx) -> Result<RefreshOutcome> {
        // ========== 第 1 步: 提取 ==========
        let rows = match self.extractor.fetch_rows(executor).await? {
            Some(rows) => rows,
            None => {
                warn!("{} ⚠️ 未找到成绩表格", ctx);
                return Ok(RefreshOutcome::NoTable);
            }
        };

        if rows.is_empty() {
            warn!("{} ⚠️ 表格中没有成绩行", ctx);
            return Ok(RefreshOutcome::NoData);
        }

        let extraction = TableExtractor::parse(&rows);

        if self.verbose_logging {
            info!(
                "{} 解析 {} 行: {} 条通过记录, {} 次挂科",
                ctx,
                rows.len(),
                extraction.records.len(),
                extraction.failed_count
            );
        }

        // ========== 第 2 步: 聚合 ==========
        let stats = match stats_aggregator::aggregate(&extraction) {
            Some(stats) => stats,
            None => {
                warn!("{} ⚠️ 没有有效的成绩数据", ctx);
                return Ok(RefreshOutcome::NoData);
            }
        };

        // ========== 第 3 步: 渲染 ==========
        match self.presenter.render(executor, &stats).await? {
            RenderOutcome::Created => {
                info!("{} ✓ 挂件已创建: {}", ctx, stats);
                Ok(RefreshOutcome::Rendered {
                    stats,
                    created: true,
                })
            }
            RenderOutcome::Updated => {
                info!("{} ✓ 挂件已更新: {}", ctx, stats);
                Ok(RefreshOutcome::Rendered {
                    stats,
                    created: false,
                })
            }
            RenderOutcome::Stale => {
                warn!("{} ⚠️ 挂件子节点数不符, 跳过更新", ctx);
                Ok(RefreshOutcome::WidgetStale)
            }
            RenderOutcome::NoTable => {
                // 提取和渲染之间表格被移除了，当作没找到处理
                warn!("{} ⚠️ 渲染时表格已被移除", ctx);
                Ok(RefreshOutcome::NoTable)
            }
        }
    }
}
