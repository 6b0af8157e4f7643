//! 成绩表格提取服务 - 业务能力层
//!
//! 只负责"读表格"能力：从页面取回原始行数据，再解析成类型化的成绩记录。
//! 表格不存在不是错误，返回 None 表示"还没有数据"。

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Selectors;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;
use crate::models::{Grade, GradeRecord, RawRow};

/// 成绩行至少要有的单元格数（成绩在第 10 列，0 起算）
const MIN_CELLS: usize = 11;
/// 学分所在列
const CREDITS_CELL: usize = 7;
/// 成绩所在列
const GRADE_CELL: usize = 10;

/// 一次提取的结果
#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    /// 通过课程的成绩记录（成绩 1–4）
    pub records: Vec<GradeRecord>,
    /// 挂科次数（成绩为 5 的行）
    pub failed_count: usize,
}

/// 成绩表格提取服务
///
/// 职责：
/// - 用注入的选择器定位表格和成绩行
/// - 把每行的单元格文本解析成 GradeRecord
/// - 静默跳过格式不对的行，不产生部分记录
pub struct TableExtractor {
    selectors: Selectors,
}

impl TableExtractor {
    pub fn new(selectors: Selectors) -> Self {
        Self { selectors }
    }

    /// 从页面取回当前可见的原始行数据
    ///
    /// 表格不存在时返回 None（还没有数据，不是错误）
    pub async fn fetch_rows(&self, executor: &JsExecutor) -> AppResult<Option<Vec<RawRow>>> {
        let js = format!(
            r#"
            (() => {{
                try {{
                    const table = document.querySelector({table});
                    if (!table) {{
                        return null;
                    }}
                    const items = table.querySelectorAll({item});
                    const rows = [];
                    for (const item of items) {{
                        const cells = item.getElementsByTagName('td');
                        const texts = [];
                        for (const c of cells) {{
                            texts.push((c.textContent || '').trim());
                        }}
                        rows.push({{ cells: texts }});
                    }}
                    return rows;
                }} catch (e) {{
                    return 'error: ' + e.message;
                }}
            }})()
            "#,
            table = serde_json::to_string(&self.selectors.table)?,
            item = serde_json::to_string(&self.selectors.item)?,
        );

        let result = executor.eval(js).await?;
        match result {
            JsonValue::Null => Ok(None),
            JsonValue::String(message) => Err(AppError::page_exception(message)),
            other => {
                let rows: Vec<RawRow> = serde_json::from_value(other)?;
                debug!("取回 {} 行原始数据", rows.len());
                Ok(Some(rows))
            }
        }
    }

    /// 把原始行解析成成绩记录
    ///
    /// 规则（逐行独立，跳过不影响整批）：
    /// - 单元格不足 11 个：跳过
    /// - 学分（第 7 列）或成绩（第 10 列）解析不出数字：跳过
    /// - 学分为负：视为脏数据，跳过
    /// - 成绩 1–4：生成记录；成绩 5：只累计挂科数；其他数值：整行忽略
    pub fn parse(rows: &[RawRow]) -> Extraction {
        let mut extraction = Extraction::default();

        for row in rows {
            if row.cells.len() < MIN_CELLS {
                continue;
            }

            let credits = match parse_number(&row.cells[CREDITS_CELL]) {
                Some(c) => c,
                None => continue,
            };
            let score = match parse_number(&row.cells[GRADE_CELL]) {
                Some(s) => s,
                None => continue,
            };
            if credits < 0.0 {
                continue;
            }

            match Grade::from_score(score) {
                Some(grade) if grade.is_fail() => extraction.failed_count += 1,
                Some(grade) => extraction.records.push(GradeRecord::new(credits, grade)),
                None => {}
            }
        }

        extraction
    }
}

/// 解析单元格文本中的数值
///
/// 与页面原生 parseFloat 的行为保持一致：接受前导数字（"7.5 ECTS" → 7.5），
/// 另外把逗号小数（"7,5"）归一化为点号；完全不是数字时返回 None
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }

    let re = Regex::new(r"^[+-]?[0-9]+(?:[.,][0-9]+)?").ok()?;
    let matched = re.find(trimmed)?;
    matched.as_str().replace(',', ".").parse::<f64>().ok()
}
