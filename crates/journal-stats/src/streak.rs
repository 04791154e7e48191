//! Consecutive-day journaling streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Streak information for a set of journaling dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Run of consecutive days ending today.
    pub current: u32,
    /// Longest run ever.
    pub longest: u32,
}

impl Streaks {
    /// Compute both streaks over the unique journaling dates.
    pub fn compute(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            current: current_streak(dates, today),
            longest: longest_streak(dates),
        }
    }
}

/// Longest run of dates each exactly one day after the previous.
///
/// Zero for an empty set, at least one otherwise.
pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    longest
}

/// Days journaled walking back from `today` until the first gap.
///
/// Zero when `today` has no entry.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut day = Some(today);

    while let Some(d) = day.filter(|d| dates.contains(d)) {
        streak += 1;
        day = d.pred_opt();
    }

    streak
}
