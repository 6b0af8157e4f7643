use serde::{Deserialize, Serialize};

/// 一次计算的汇总统计结果
///
/// 不变式：只有在通过课程的总学分大于 0 时才会构造本结构；
/// 没有有效数据时上游直接返回 None，而不是一个全零对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// 学分加权平均成绩（保留两位小数）
    pub weighted_average: f64,
    /// 学分加权平均绩点（0.0–4.0，保留两位小数）
    pub gpa: f64,
    /// 通过课程的总学分
    pub total_credits: f64,
    /// 通过课程数量
    pub course_count: usize,
    /// 挂科次数（成绩为 5 的行）
    pub failed_count: usize,
}

impl std::fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "平均 {:.2} | GPA {:.2} | 学分 {} | 课程 {} | 挂科 {}",
            self.weighted_average, self.gpa, self.total_credits, self.course_count, self.failed_count
        )
    }
}
