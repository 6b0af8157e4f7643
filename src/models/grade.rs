use serde::{Deserialize, Serialize};

/// 奥地利五级成绩枚举（1 最好，5 不及格）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 优 (Sehr gut)
    SehrGut = 1,
    /// 良 (Gut)
    Gut = 2,
    /// 中 (Befriedigend)
    Befriedigend = 3,
    /// 及格 (Genügend)
    Genuegend = 4,
    /// 不及格 (Nicht genügend)
    NichtGenuegend = 5,
}

impl Grade {
    /// 获取成绩数值
    pub fn value(self) -> u8 {
        self as u8
    }

    /// 转换为 0.0–4.0 的绩点（GPA）
    ///
    /// 固定单调递减映射：1→4.0、2→3.0、3→2.0、4→1.0、5→0.0
    pub fn grade_points(self) -> f64 {
        match self {
            Grade::SehrGut => 4.0,
            Grade::Gut => 3.0,
            Grade::Befriedigend => 2.0,
            Grade::Genuegend => 1.0,
            Grade::NichtGenuegend => 0.0,
        }
    }

    /// 是否为不及格
    pub fn is_fail(self) -> bool {
        matches!(self, Grade::NichtGenuegend)
    }

    /// 从页面解析出的数值构造成绩
    ///
    /// 只接受 1–5 的整数值；超出范围或非整数（0、6、2.5 等）返回 None，
    /// 这类行既不算通过也不算挂科，直接忽略
    pub fn from_score(score: f64) -> Option<Self> {
        if score.fract() != 0.0 {
            return None;
        }
        match score as i64 {
            1 => Some(Grade::SehrGut),
            2 => Some(Grade::Gut),
            3 => Some(Grade::Befriedigend),
            4 => Some(Grade::Genuegend),
            5 => Some(Grade::NichtGenuegend),
            _ => None,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Grade::SehrGut => "Sehr gut",
            Grade::Gut => "Gut",
            Grade::Befriedigend => "Befriedigend",
            Grade::Genuegend => "Genügend",
            Grade::NichtGenuegend => "Nicht genügend",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.value(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points_mapping() {
        assert_eq!(Grade::SehrGut.grade_points(), 4.0);
        assert_eq!(Grade::Gut.grade_points(), 3.0);
        assert_eq!(Grade::Befriedigend.grade_points(), 2.0);
        assert_eq!(Grade::Genuegend.grade_points(), 1.0);
        assert_eq!(Grade::NichtGenuegend.grade_points(), 0.0);
    }

    #[test]
    fn test_from_score_accepts_integral_range() {
        assert_eq!(Grade::from_score(1.0), Some(Grade::SehrGut));
        assert_eq!(Grade::from_score(4.0), Some(Grade::Genuegend));
        assert_eq!(Grade::from_score(5.0), Some(Grade::NichtGenuegend));
    }

    #[test]
    fn test_from_score_rejects_out_of_range() {
        assert_eq!(Grade::from_score(0.0), None);
        assert_eq!(Grade::from_score(6.0), None);
        assert_eq!(Grade::from_score(-1.0), None);
        // 非整数成绩同样忽略
        assert_eq!(Grade::from_score(2.5), None);
    }

    #[test]
    fn test_only_five_is_fail() {
        assert!(Grade::NichtGenuegend.is_fail());
        assert!(!Grade::Genuegend.is_fail());
        assert!(!Grade::SehrGut.is_fail());
    }
}
