//! 统计挂件渲染服务 - 业务能力层
//!
//! 只负责"维护统计挂件"能力：第一次渲染时在表格前插入挂件，
//! 之后按字段标识原地更新数值，绝不重复创建、绝不动表格本身。

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Selectors;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;
use crate::models::SummaryStats;

/// 挂件字段数（固定顺序：平均分、GPA、总学分、课程数、挂科数）
pub const FIELD_COUNT: usize = 5;

/// 挂件容器样式
const CONTAINER_STYLE: &str = "background-color: #e5eff6; padding: 8px 20px; margin-left: 7px; border-radius: 4px; display: flex; gap: 20px;";
/// 字段标签样式
const LABEL_STYLE: &str = "font-weight: 600;";
/// 字段数值样式
const VALUE_STYLE: &str = "font-weight: 600; color: #0063a6;";

/// 挂件中的一个字段：稳定标识 + 显示标签 + 格式化后的数值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatField {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// 一次渲染的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// 挂件首次创建并插入
    Created,
    /// 已有挂件，数值原地更新
    Updated,
    /// 已有挂件但子节点数不对（被宿主改过），按约定不修不碰
    Stale,
    /// 渲染瞬间表格已不在页面上
    NoTable,
}

/// 统计挂件渲染服务
///
/// 职责：
/// - 按稳定的容器 class 找到（或创建）唯一挂件
/// - 用 data-field 标识更新字段值，不依赖子节点位置
/// - 不处理何时渲染的决策
pub struct WidgetPresenter {
    selectors: Selectors,
}

impl WidgetPresenter {
    pub fn new(selectors: Selectors) -> Self {
        Self { selectors }
    }

    /// 渲染（或原地更新）统计挂件
    pub async fn render(
        &self,
        executor: &JsExecutor,
        stats: &SummaryStats,
    ) -> AppResult<RenderOutcome> {
        let fields = build_fields(stats);
        let js = format!(
            r#"
            (() => {{
                try {{
                    const table = document.querySelector({table});
                    if (!table || !table.parentNode) {{
                        return 'no-table';
                    }}
                    const fields = {fields};
                    let container = document.querySelector({container});
                    if (!container) {{
                        container = document.createElement('div');
                        container.className = {container_class};
                        container.style.cssText = {container_style};
                        for (const f of fields) {{
                            const el = document.createElement('div');
                            el.style.cssText = {label_style};
                            const span = document.createElement('span');
                            span.style.cssText = {value_style};
                            span.dataset.field = f.id;
                            span.textContent = f.value;
                            el.appendChild(document.createTextNode(f.label + ': '));
                            el.appendChild(span);
                            container.appendChild(el);
                        }}
                        table.parentNode.insertBefore(container, table);
                        return 'created';
                    }}
                    if (container.childElementCount !== {count}) {{
                        return 'stale';
                    }}
                    for (const f of fields) {{
                        const span = container.querySelector('[data-field="' + f.id + '"]');
                        if (span) {{
                            span.textContent = f.value;
                        }}
                    }}
                    return 'updated';
                }} catch (e) {{
                    return 'error: ' + e.message;
                }}
            }})()
            "#,
            table = serde_json::to_string(&self.selectors.table)?,
            container = serde_json::to_string(&self.selectors.container)?,
            container_class = serde_json::to_string(self.selectors.container_class())?,
            container_style = serde_json::to_string(CONTAINER_STYLE)?,
            label_style = serde_json::to_string(LABEL_STYLE)?,
            value_style = serde_json::to_string(VALUE_STYLE)?,
            fields = serde_json::to_string(&fields)?,
            count = FIELD_COUNT,
        );

        let result = executor.eval(js).await?;
        let outcome = parse_outcome(&result)?;
        debug!("挂件渲染结果: {:?}", outcome);
        Ok(outcome)
    }
}

/// 把统计结果映射成固定顺序的挂件字段
pub fn build_fields(stats: &SummaryStats) -> Vec<StatField> {
    vec![
        StatField {
            id: "average",
            label: "Average",
            value: format!("{:.2}", stats.weighted_average),
        },
        StatField {
            id: "gpa",
            label: "GPA",
            value: format!("{:.2}", stats.gpa),
        },
        StatField {
            id: "ects",
            label: "Total ECTS",
            value: format_credits(stats.total_credits),
        },
        StatField {
            id: "courses",
            label: "Courses Completed",
            value: stats.course_count.to_string(),
        },
        StatField {
            id: "failed",
            label: "Failed Attempts",
            value: stats.failed_count.to_string(),
        },
    ]
}

/// 学分显示：整数值不带小数点（15 而不是 15.0），小数值原样显示
fn format_credits(credits: f64) -> String {
    if credits.fract() == 0.0 {
        format!("{}", credits as i64)
    } else {
        format!("{}", credits)
    }
}

fn parse_outcome(result: &JsonValue) -> AppResult<RenderOutcome> {
    match result.as_str() {
        Some("created") => Ok(RenderOutcome::Created),
        Some("updated") => Ok(RenderOutcome::Updated),
        Some("stale") => Ok(RenderOutcome::Stale),
        Some("no-table") => Ok(RenderOutcome::NoTable),
        Some(other) => Err(AppError::page_exception(other)),
        None => Err(AppError::page_exception(result.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> SummaryStats {
        SummaryStats {
            weighted_average: 1.33,
            gpa: 3.67,
            total_credits: 15.0,
            course_count: 2,
            failed_count: 1,
        }
    }

    #[test]
    fn test_field_order_and_ids() {
        let fields = build_fields(&sample_stats());
        assert_eq!(fields.len(), FIELD_COUNT);

        let ids: Vec<&str> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["average", "gpa", "ects", "courses", "failed"]);

        let labels: Vec<&str> = fields.iter().map(|f| f.label).collect();
        assert_eq!(
            labels,
            vec![
                "Average",
                "GPA",
                "Total ECTS",
                "Courses Completed",
                "Failed Attempts"
            ]
        );
    }

    #[test]
    fn test_field_value_formatting() {
        let fields = build_fields(&sample_stats());
        assert_eq!(fields[0].value, "1.33");
        assert_eq!(fields[1].value, "3.67");
        assert_eq!(fields[2].value, "15");
        assert_eq!(fields[3].value, "2");
        assert_eq!(fields[4].value, "1");
    }

    #[test]
    fn test_two_decimals_are_padded() {
        let stats = SummaryStats {
            weighted_average: 1.5,
            gpa: 3.0,
            total_credits: 7.5,
            course_count: 1,
            failed_count: 0,
        };
        let fields = build_fields(&stats);
        assert_eq!(fields[0].value, "1.50");
        assert_eq!(fields[1].value, "3.00");
        // 小数学分原样显示
        assert_eq!(fields[2].value, "7.5");
    }

    #[test]
    fn test_parse_outcome_variants() {
        assert_eq!(
            parse_outcome(&serde_json::json!("created")).unwrap(),
            RenderOutcome::Created
        );
        assert_eq!(
            parse_outcome(&serde_json::json!("updated")).unwrap(),
            RenderOutcome::Updated
        );
        assert!(parse_outcome(&serde_json::json!("error: boom")).is_err());
    }

    #[test]
    fn test_idempotent_field_building() {
        // 相同统计结果必然生成相同的字段列表
        let stats = sample_stats();
        assert_eq!(build_fields(&stats), build_fields(&stats));
    }
}
