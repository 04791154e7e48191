//! Error types for the statistics engine.

use thiserror::Error;

/// Errors raised at the boundary of the statistics engine.
///
/// Aggregation itself is total: empty input yields no report rather than an
/// error, and malformed grades or moods are skipped.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("unknown mood '{0}'")]
    UnknownMood(String),
    #[error("unknown period '{0}'")]
    UnknownPeriod(String),
}

pub type StatsResult<T> = Result<T, StatsError>;
