//! 统计聚合服务 - 业务能力层
//!
//! 纯函数：把一次提取的成绩记录折叠成汇总统计，无副作用、无 IO，
//! 相同输入必得相同输出

use crate::models::SummaryStats;
use crate::services::table_extractor::Extraction;

/// 把提取结果折叠成汇总统计
///
/// 总学分为 0（没有任何带学分的通过课程）时返回 None：
/// 这是页面数据尚未加载或全部行都脏的预期状态，不是错误
pub fn aggregate(extraction: &Extraction) -> Option<SummaryStats> {
    let total_credits: f64 = extraction.records.iter().map(|r| r.credits).sum();
    if total_credits <= 0.0 {
        return None;
    }

    let grade_sum: f64 = extraction
        .records
        .iter()
        .map(|r| f64::from(r.grade.value()) * r.credits)
        .sum();
    let gpa_sum: f64 = extraction
        .records
        .iter()
        .map(|r| r.grade_points() * r.credits)
        .sum();

    // 舍入只在最后做一次，避免逐行舍入累积误差
    Some(SummaryStats {
        weighted_average: round2(grade_sum / total_credits),
        gpa: round2(gpa_sum / total_credits),
        total_credits,
        course_count: extraction.records.len(),
        failed_count: extraction.failed_count,
    })
}

/// 四舍五入到两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, GradeRecord};

    #[test]
    fn test_reference_scenario() {
        // (5 学分, 成绩 2), (10 学分, 成绩 1), 外加一次挂科
        let extraction = Extraction {
            records: vec![
                GradeRecord::new(5.0, Grade::Gut),
                GradeRecord::new(10.0, Grade::SehrGut),
            ],
            failed_count: 1,
        };

        let stats = aggregate(&extraction).unwrap();
        assert_eq!(stats.total_credits, 15.0);
        assert_eq!(stats.weighted_average, 1.33);
        assert_eq!(stats.gpa, 3.67);
        assert_eq!(stats.course_count, 2);
        assert_eq!(stats.failed_count, 1);
    }

    #[test]
    fn test_empty_extraction_is_absent() {
        assert_eq!(aggregate(&Extraction::default()), None);
    }

    #[test]
    fn test_zero_total_credits_is_absent() {
        // 只有 0 学分的通过课程：没有权重，不构造全零统计
        let extraction = Extraction {
            records: vec![GradeRecord::new(0.0, Grade::SehrGut)],
            failed_count: 0,
        };
        assert_eq!(aggregate(&extraction), None);
    }

    #[test]
    fn test_failed_only_is_absent() {
        // 全部挂科时没有学分权重，同样视为无数据
        let extraction = Extraction {
            records: vec![],
            failed_count: 3,
        };
        assert_eq!(aggregate(&extraction), None);
    }

    #[test]
    fn test_fractional_credits() {
        let extraction = Extraction {
            records: vec![
                GradeRecord::new(2.5, Grade::SehrGut),
                GradeRecord::new(7.5, Grade::Befriedigend),
            ],
            failed_count: 0,
        };

        let stats = aggregate(&extraction).unwrap();
        assert_eq!(stats.total_credits, 10.0);
        // (1*2.5 + 3*7.5) / 10 = 2.5
        assert_eq!(stats.weighted_average, 2.5);
        // (4*2.5 + 2*7.5) / 10 = 2.5
        assert_eq!(stats.gpa, 2.5);
    }

    #[test]
    fn test_rounding_applied_once_at_the_end() {
        // 1/3 的循环小数只在最终结果处舍入
        let extraction = Extraction {
            records: vec![
                GradeRecord::new(1.0, Grade::SehrGut),
                GradeRecord::new(2.0, Grade::Gut),
            ],
            failed_count: 0,
        };

        let stats = aggregate(&extraction).unwrap();
        // (1 + 4) / 3 = 1.666… → 1.67
        assert_eq!(stats.weighted_average, 1.67);
        // (4 + 6) / 3 = 3.333… → 3.33
        assert_eq!(stats.gpa, 3.33);
    }
}
