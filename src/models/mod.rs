pub mod grade;
pub mod record;
pub mod stats;

pub use grade::Grade;
pub use record::{GradeRecord, RawRow};
pub use stats::SummaryStats;
