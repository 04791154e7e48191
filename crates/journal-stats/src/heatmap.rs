//! Daily word-count heatmap over a trailing window.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest window a heatmap covers, about ten years.
pub const MAX_HEATMAP_DAYS: u32 = 3660;

/// Words written per day over a trailing window ending today.
///
/// Every day in the window is present; days without entries map to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Heatmap {
    days: BTreeMap<NaiveDate, u64>,
}

impl Heatmap {
    /// Sum `(date, words)` pairs into the `window_days` days ending `today`.
    ///
    /// Pairs outside the window are dropped; a zero window is empty. Windows
    /// longer than [`MAX_HEATMAP_DAYS`] are clamped, and a window reaching
    /// before the first representable date starts there.
    pub fn build(
        word_counts: impl IntoIterator<Item = (NaiveDate, u64)>,
        today: NaiveDate,
        window_days: u32,
    ) -> Self {
        if window_days == 0 {
            return Self::default();
        }

        let window = window_days.min(MAX_HEATMAP_DAYS);
        let start = today
            .checked_sub_signed(Duration::days(i64::from(window) - 1))
            .unwrap_or(NaiveDate::MIN);
        let mut days: BTreeMap<NaiveDate, u64> = start
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|d| (d, 0))
            .collect();

        for (date, words) in word_counts {
            if let Some(total) = days.get_mut(&date) {
                *total += words;
            }
        }

        Self { days }
    }

    /// Words on a date, zero outside the window.
    pub fn get(&self, date: NaiveDate) -> u64 {
        self.days.get(&date).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First day of the window.
    pub fn start(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Busiest day's word count.
    pub fn max(&self) -> u64 {
        self.days.values().copied().max().unwrap_or(0)
    }

    /// Shade level 0..=4 of a date relative to the busiest day.
    pub fn level(&self, date: NaiveDate) -> u8 {
        let words = self.get(date);
        let max = self.max();
        if words == 0 || max == 0 {
            return 0;
        }
        let ratio = words as f64 / max as f64;
        if ratio < 0.25 {
            1
        } else if ratio < 0.5 {
            2
        } else if ratio < 0.75 {
            3
        } else {
            4
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(d, w)| (*d, *w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_covers_trailing_days_inclusive() {
        let heatmap = Heatmap::build([], date("2024-03-01"), 90);
        assert_eq!(heatmap.len(), 90);
        assert_eq!(heatmap.start(), Some(date("2023-12-03")));
        assert!(heatmap.iter().all(|(_, w)| w == 0));
    }

    #[test]
    fn test_sums_entries_sharing_a_date() {
        let counts = [
            (date("2024-03-01"), 10),
            (date("2024-03-01"), 5),
            (date("2024-02-28"), 7),
        ];
        let heatmap = Heatmap::build(counts, date("2024-03-01"), 7);
        assert_eq!(heatmap.get(date("2024-03-01")), 15);
        assert_eq!(heatmap.get(date("2024-02-28")), 7);
        assert_eq!(heatmap.get(date("2024-02-29")), 0);
        assert_eq!(heatmap.max(), 15);
    }

    #[test]
    fn test_drops_days_outside_window() {
        let counts = [(date("2024-01-01"), 100), (date("2024-03-02"), 100)];
        let heatmap = Heatmap::build(counts, date("2024-03-01"), 30);
        assert_eq!(heatmap.max(), 0);
        assert_eq!(heatmap.get(date("2024-01-01")), 0);
    }

    #[test]
    fn test_zero_window_is_empty() {
        let heatmap = Heatmap::build([(date("2024-03-01"), 3)], date("2024-03-01"), 0);
        assert!(heatmap.is_empty());
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let today = date("2024-03-01");
        let heatmap = Heatmap::build([(today, 3)], today, u32::MAX);
        assert_eq!(heatmap.len(), MAX_HEATMAP_DAYS as usize);
        assert_eq!(heatmap.get(today), 3);
    }

    #[test]
    fn test_window_stops_at_earliest_date() {
        let today = NaiveDate::MIN + Duration::days(4);
        let heatmap = Heatmap::build([(today, 2)], today, 30);
        assert_eq!(heatmap.start(), Some(NaiveDate::MIN));
        assert_eq!(heatmap.len(), 5);
    }

    #[test]
    fn test_levels() {
        let counts = [
            (date("2024-03-01"), 100),
            (date("2024-02-29"), 10),
            (date("2024-02-28"), 60),
        ];
        let heatmap = Heatmap::build(counts, date("2024-03-01"), 5);
        assert_eq!(heatmap.level(date("2024-03-01")), 4);
        assert_eq!(heatmap.level(date("2024-02-29")), 1);
        assert_eq!(heatmap.level(date("2024-02-28")), 3);
        assert_eq!(heatmap.level(date("2024-02-27")), 0);
    }

    #[test]
    fn test_serializes_as_date_map() {
        let heatmap = Heatmap::build([(date("2024-03-01"), 4)], date("2024-03-01"), 2);
        let json = serde_json::to_string(&heatmap).unwrap();
        insta::assert_snapshot!(json, @r#"{"2024-02-29":0,"2024-03-01":4}"#);
    }
}
