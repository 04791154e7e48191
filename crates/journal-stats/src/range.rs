//! Inclusive date ranges and the reporting periods built on them.

use crate::error::{StatsError, StatsResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> StatsResult<NaiveDate> {
    let s = s.trim();
    // chrono accepts unpadded fields; stored dates are always zero padded.
    if s.len() != 10 {
        return Err(StatsError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StatsError::InvalidDate(s.to_string()))
}

/// Inclusive `[from, to]` range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Unbounded on both ends.
    pub fn all() -> Self {
        Self::default()
    }

    /// A single week starting at `start`.
    pub fn week(start: NaiveDate) -> Self {
        Self::new(Some(start), Some(start + Duration::days(6)))
    }

    /// Parse optional `YYYY-MM-DD` bounds; empty strings count as absent.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> StatsResult<Self> {
        let bound = |s: Option<&str>| -> StatsResult<Option<NaiveDate>> {
            match s.map(str::trim).filter(|s| !s.is_empty()) {
                Some(s) => parse_date(s).map(Some),
                None => Ok(None),
            }
        };
        Ok(Self::new(bound(from)?, bound(to)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.to) {
            (None, None) => write!(f, "all time"),
            (Some(from), None) => write!(f, "since {}", from),
            (None, Some(to)) => write!(f, "until {}", to),
            (Some(from), Some(to)) => write!(f, "{} to {}", from, to),
        }
    }
}

/// Reporting period presets offered by the stats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    Month,
    #[default]
    Quarter,
    HalfYear,
    Year,
    AllTime,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Week,
        Period::Month,
        Period::Quarter,
        Period::HalfYear,
        Period::Year,
        Period::AllTime,
    ];

    /// Trailing length in days, `None` for all time.
    pub fn days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::HalfYear => Some(180),
            Self::Year => Some(365),
            Self::AllTime => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Week => "Last 7 days",
            Self::Month => "Last 30 days",
            Self::Quarter => "Last 90 days",
            Self::HalfYear => "Last 6 months",
            Self::Year => "Last year",
            Self::AllTime => "All time",
        }
    }

    /// `[today - days, today]`, or unbounded for all time.
    pub fn range(self, today: NaiveDate) -> DateRange {
        match self.days() {
            Some(days) => DateRange::new(Some(today - Duration::days(days)), Some(today)),
            None => DateRange::all(),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for Period {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "7d" => Ok(Self::Week),
            "month" | "30d" => Ok(Self::Month),
            "quarter" | "90d" => Ok(Self::Quarter),
            "half_year" | "half-year" | "180d" => Ok(Self::HalfYear),
            "year" | "365d" => Ok(Self::Year),
            "all" | "all_time" | "all-time" => Ok(Self::AllTime),
            _ => Err(StatsError::UnknownPeriod(s.to_string())),
        }
    }
}
