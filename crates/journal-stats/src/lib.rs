//! # journal-stats
//!
//! Statistics engine for the mood journal.
//!
//! ## Features
//!
//! - Markup stripping and word/sentence/character counting
//! - Current and longest journaling streaks
//! - Grade, mood, weekday and monthly distributions
//! - Trailing-window word-count heatmap
//! - Stats-derived weekly wraps
//!
//! Every computation is a pure function of the entries passed in. Callers
//! supply "today" explicitly, so results never depend on the wall clock.

mod aggregate;
mod distribution;
mod entry;
mod error;
mod heatmap;
mod range;
mod report;
mod source;
mod streak;
pub mod text;
mod wrap;

pub use aggregate::{compute_stats, StatsOptions, DEFAULT_HEATMAP_DAYS};
pub use distribution::{
    DayCount, DayOfWeekBreakdown, GradeBucket, GradeDistribution, MonthCount, MonthlyActivity,
    MoodTally, WEEKDAY_NAMES,
};
pub use entry::{Attachment, Comment, Entry, EntryId, Mood, Version, MAX_GRADE, MIN_GRADE};
pub use error::{StatsError, StatsResult};
pub use heatmap::{Heatmap, MAX_HEATMAP_DAYS};
pub use range::{parse_date, DateRange, Period};
pub use report::{StatsReport, StatsResponse};
pub use source::{stats_from_source, EntrySource};
pub use streak::Streaks;
pub use text::TextMetrics;
pub use wrap::{DaySummary, Trend, WeekStart, WeeklyWrap};

/// Round to one decimal place, halves away from zero.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of `sum / count` rounded to one decimal, `None` for an empty pool.
pub(crate) fn mean1(sum: u64, count: u64) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(round1(sum as f64 / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1_half_away_from_zero() {
        assert_eq!(round1(7.333_333), 7.3);
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round1(-7.25), -7.3);
        assert_eq!(round1(2.0), 2.0);
    }

    #[test]
    fn test_mean1_empty_pool() {
        assert_eq!(mean1(0, 0), None);
        assert_eq!(mean1(22, 3), Some(7.3));
    }
}
