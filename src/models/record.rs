use serde::{Deserialize, Serialize};

use crate::models::grade::Grade;

/// 页面上一行成绩的原始单元格文本
///
/// 由页面脚本采集并按列顺序返回，未做任何解析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }
}

/// 一门已通过课程的成绩记录
///
/// 每次重算时从当前可见的行数据重新构造，从不修改，用完即弃
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeRecord {
    /// 学分（ECTS，非负，允许小数）
    pub credits: f64,
    /// 成绩（1–4，挂科行不会生成记录）
    pub grade: Grade,
}

impl GradeRecord {
    pub fn new(credits: f64, grade: Grade) -> Self {
        Self { credits, grade }
    }

    /// 该记录的绩点
    pub fn grade_points(&self) -> f64 {
        self.grade.grade_points()
    }
}
