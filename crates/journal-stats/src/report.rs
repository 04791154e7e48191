//! The stats report handed to callers.

use crate::distribution::{DayCount, GradeBucket, MonthCount, MoodTally};
use crate::entry::Mood;
use crate::heatmap::Heatmap;
use chrono::NaiveDate;
use serde::Serialize;

/// Aggregate statistics over a set of entries.
///
/// Built fresh per query by [`compute_stats`](crate::compute_stats) and never
/// mutated afterwards; the fields are public for reading only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total_entries: u32,
    /// Unique dates with at least one entry.
    pub days_journaled: u32,

    pub total_words: u64,
    pub total_sentences: u64,
    pub total_chars: u64,
    pub avg_words_per_entry: u64,
    pub avg_sentences_per_entry: u64,

    pub total_comments: u64,
    pub total_attachments: u64,
    pub total_versions: u64,

    #[serde(rename = "avgGrade")]
    pub average_grade: Option<f64>,
    pub best_grade: Option<u8>,
    pub worst_grade: Option<u8>,
    pub grade_distribution: Vec<GradeBucket>,

    pub mood_freq: MoodTally,
    pub top_mood: Option<Mood>,

    pub current_streak: u32,
    pub longest_streak: u32,

    pub peak_day: String,
    pub dow_breakdown: Vec<DayCount>,

    pub monthly_activity: Vec<MonthCount>,
    pub peak_month: String,

    pub first_entry_date: NaiveDate,
    pub last_entry_date: NaiveDate,

    #[serde(rename = "heatmapMap")]
    pub heatmap: Heatmap,

    pub max_entries_in_day: u32,
    pub avg_entries_per_active_day: f64,
}

/// JSON envelope: `{"stats": {...}}`, or `{"stats": null}` for no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub stats: Option<StatsReport>,
}

impl From<Option<StatsReport>> for StatsResponse {
    fn from(stats: Option<StatsReport>) -> Self {
        Self { stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_shape() {
        let json = serde_json::to_string(&StatsResponse::from(None)).unwrap();
        insta::assert_snapshot!(json, @r#"{"stats":null}"#);
    }
}
