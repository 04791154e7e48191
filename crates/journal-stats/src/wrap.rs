//! Stats-derived weekly summaries.

use crate::distribution::{GradeBucket, GradeDistribution, MoodTally};
use crate::entry::{Entry, Mood};
use crate::mean1;
use crate::range::DateRange;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Grade-mean difference between week halves that counts as a trend.
const TREND_THRESHOLD: f64 = 0.5;

/// How many moods a wrap highlights.
const TOP_MOODS: usize = 3;

/// Direction of grades across the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    /// Compare the mean of the later half of `grades` with the earlier half.
    pub fn from_grades(grades: &[u8]) -> Self {
        if grades.len() < 2 {
            return Self::Stable;
        }
        let (first, second) = grades.split_at(grades.len() / 2);
        let mean = |g: &[u8]| g.iter().map(|&x| f64::from(x)).sum::<f64>() / g.len() as f64;
        let delta = mean(second) - mean(first);

        if delta > TREND_THRESHOLD {
            Self::Improving
        } else if delta < -TREND_THRESHOLD {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

/// First day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Start date of the week containing `date`.
    pub fn week_containing(self, date: NaiveDate) -> NaiveDate {
        let offset = match self {
            Self::Monday => date.weekday().num_days_from_monday(),
            Self::Sunday => date.weekday().num_days_from_sunday(),
        };
        date - Duration::days(i64::from(offset))
    }
}

/// One entry picked out as a highlight of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub title: String,
    pub grade: Option<u8>,
}

impl DaySummary {
    fn of(entry: &Entry) -> Self {
        Self {
            date: entry.date,
            title: entry.title.clone(),
            grade: entry.grade(),
        }
    }
}

/// Summary of one week of journaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWrap {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub average_grade: Option<f64>,
    pub trend: Trend,
    #[serde(rename = "topEmojis")]
    pub top_moods: Vec<Mood>,
    pub grade_distribution: Vec<GradeBucket>,
    pub best_day: Option<DaySummary>,
    pub worst_day: Option<DaySummary>,
    pub mood_freq: MoodTally,
    pub days_journaled: u32,
    pub total_entries: u32,
}

impl WeeklyWrap {
    /// Summarize the seven days starting at `week_start`.
    ///
    /// Entries outside the week are ignored. Returns `None` when the week
    /// has no entries.
    pub fn generate(entries: &[Entry], week_start: NaiveDate) -> Option<Self> {
        let range = DateRange::week(week_start);
        let mut week: Vec<&Entry> = entries.iter().filter(|e| range.contains(e.date)).collect();
        if week.is_empty() {
            return None;
        }
        week.sort_by_key(|e| e.date);

        let grades: Vec<u8> = week.iter().filter_map(|e| e.grade()).collect();
        let moods = MoodTally::from_moods(week.iter().filter_map(|e| e.mood));
        let ranked = moods.ranked();
        let days: BTreeSet<NaiveDate> = week.iter().map(|e| e.date).collect();

        // Missing grades rank as zero; the first of equals wins.
        let score = |e: &Entry| e.grade().unwrap_or(0);
        let best = week
            .iter()
            .copied()
            .reduce(|best, e| if score(e) > score(best) { e } else { best });
        let worst = week
            .iter()
            .copied()
            .reduce(|worst, e| if score(e) < score(worst) { e } else { worst });

        let grade_sum: u64 = grades.iter().map(|&g| u64::from(g)).sum();

        tracing::debug!(%week_start, entries = week.len(), "generating weekly wrap");

        Some(Self {
            week_start,
            week_end: week_start + Duration::days(6),
            average_grade: mean1(grade_sum, grades.len() as u64),
            trend: Trend::from_grades(&grades),
            top_moods: ranked.iter().take(TOP_MOODS).map(|(m, _)| *m).collect(),
            grade_distribution: GradeDistribution::from_grades(grades.iter().copied()).buckets(),
            best_day: best.map(DaySummary::of),
            worst_day: worst.map(DaySummary::of),
            mood_freq: moods,
            days_journaled: days.len() as u32,
            total_entries: week.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_trend() {
        assert_eq!(Trend::from_grades(&[]), Trend::Stable);
        assert_eq!(Trend::from_grades(&[5]), Trend::Stable);
        assert_eq!(Trend::from_grades(&[4, 5, 8, 9]), Trend::Improving);
        assert_eq!(Trend::from_grades(&[9, 8, 5]), Trend::Declining);
        assert_eq!(Trend::from_grades(&[6, 7, 6, 7]), Trend::Stable);
    }

    #[test]
    fn test_week_containing() {
        // 2024-01-10 is a Wednesday.
        let d = date("2024-01-10");
        assert_eq!(WeekStart::Monday.week_containing(d), date("2024-01-08"));
        assert_eq!(WeekStart::Sunday.week_containing(d), date("2024-01-07"));
        assert_eq!(WeekStart::Monday.week_containing(date("2024-01-08")), date("2024-01-08"));
    }

    #[test]
    fn test_empty_week_has_no_wrap() {
        let entries = vec![Entry::new(date("2024-01-20")).with_grade(5)];
        assert_eq!(WeeklyWrap::generate(&entries, date("2024-01-08")), None);
    }

    #[test]
    fn test_generate() {
        let entries = vec![
            Entry::new(date("2024-01-10")).with_title("Rain").with_grade(4).with_mood(Mood::Sad),
            Entry::new(date("2024-01-08")).with_title("Start").with_grade(6).with_mood(Mood::Happy),
            Entry::new(date("2024-01-12")).with_title("Party").with_grade(9).with_mood(Mood::Playful),
            Entry::new(date("2024-01-12")).with_title("Late").with_grade(9).with_mood(Mood::Happy),
            Entry::new(date("2024-01-15")).with_title("Next week").with_grade(1),
        ];

        let wrap = WeeklyWrap::generate(&entries, date("2024-01-08")).unwrap();
        assert_eq!(wrap.week_end, date("2024-01-14"));
        assert_eq!(wrap.total_entries, 4);
        assert_eq!(wrap.days_journaled, 3);
        assert_eq!(wrap.average_grade, Some(7.0));
        // Ordered by date: [6, 4, 9, 9] -> halves 5.0 and 9.0.
        assert_eq!(wrap.trend, Trend::Improving);
        assert_eq!(wrap.top_moods, vec![Mood::Happy, Mood::Sad, Mood::Playful]);
        assert_eq!(wrap.best_day.as_ref().unwrap().title, "Party");
        assert_eq!(wrap.worst_day.as_ref().unwrap().title, "Rain");
        assert_eq!(wrap.grade_distribution[8].count, 2);
    }

    #[test]
    fn test_ungraded_entry_is_worst_day() {
        let entries = vec![
            Entry::new(date("2024-01-08")).with_grade(3),
            Entry::new(date("2024-01-09")).with_title("Blank"),
        ];
        let wrap = WeeklyWrap::generate(&entries, date("2024-01-08")).unwrap();
        let worst = wrap.worst_day.unwrap();
        assert_eq!(worst.title, "Blank");
        assert_eq!(worst.grade, None);
        assert_eq!(wrap.trend, Trend::Stable);
    }

    #[test]
    fn test_wrap_json_field_names() {
        let entries = vec![Entry::new(date("2024-01-08")).with_grade(7).with_mood(Mood::Loved)];
        let wrap = WeeklyWrap::generate(&entries, date("2024-01-08")).unwrap();
        let value = serde_json::to_value(&wrap).unwrap();
        assert_eq!(value["weekStart"], "2024-01-08");
        assert_eq!(value["weekEnd"], "2024-01-14");
        assert_eq!(value["trend"], "stable");
        assert_eq!(value["topEmojis"][0], "loved");
        assert!(value["moodFreq"].is_object());
        assert_eq!(value["moodFreq"]["loved"], 1);
    }

    #[test]
    fn test_wrap_json_round_trip_keeps_mood_order() {
        let entries = vec![
            Entry::new(date("2024-01-08")).with_mood(Mood::Sad),
            Entry::new(date("2024-01-09")).with_mood(Mood::Happy),
            Entry::new(date("2024-01-10")).with_mood(Mood::Happy),
        ];
        let wrap = WeeklyWrap::generate(&entries, date("2024-01-08")).unwrap();
        let json = serde_json::to_string(&wrap).unwrap();
        assert!(json.contains(r#""moodFreq":{"sad":1,"happy":2}"#));

        let back: WeeklyWrap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wrap);
        assert_eq!(back.mood_freq.get(Mood::Happy), 2);
    }
}
