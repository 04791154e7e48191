//! Histograms over grades, moods, weekdays and months.
//!
//! Every "peak"/"top" value uses an explicit first-encountered tie-break:
//! for moods that is input order, for weekdays Sunday-first index order, for
//! months ascending chronological order.

use crate::entry::{Mood, MAX_GRADE, MIN_GRADE};
use chrono::{Datelike, NaiveDate};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Weekday names, Sunday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Count of entries with a given grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBucket {
    pub grade: u8,
    pub count: u32,
}

/// Ten-bucket grade histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeDistribution {
    counts: [u32; MAX_GRADE as usize],
}

impl GradeDistribution {
    /// Build from grades; values outside the valid range are ignored.
    pub fn from_grades(grades: impl IntoIterator<Item = u8>) -> Self {
        grades.into_iter().fold(Self::default(), |mut dist, grade| {
            dist.record(grade);
            dist
        })
    }

    pub fn record(&mut self, grade: u8) {
        if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
            self.counts[(grade - MIN_GRADE) as usize] += 1;
        }
    }

    pub fn count(&self, grade: u8) -> u32 {
        if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
            self.counts[(grade - MIN_GRADE) as usize]
        } else {
            0
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// One bucket per grade, ascending.
    pub fn buckets(&self) -> Vec<GradeBucket> {
        (MIN_GRADE..=MAX_GRADE)
            .map(|grade| GradeBucket {
                grade,
                count: self.count(grade),
            })
            .collect()
    }
}

/// Mood frequency table in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodTally {
    counts: Vec<(Mood, u32)>,
}

impl MoodTally {
    pub fn from_moods(moods: impl IntoIterator<Item = Mood>) -> Self {
        moods.into_iter().fold(Self::default(), |mut tally, mood| {
            tally.record(mood);
            tally
        })
    }

    pub fn record(&mut self, mood: Mood) {
        match self.counts.iter_mut().find(|(m, _)| *m == mood) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((mood, 1)),
        }
    }

    pub fn get(&self, mood: Mood) -> u32 {
        self.counts
            .iter()
            .find(|(m, _)| *m == mood)
            .map_or(0, |(_, c)| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mood, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Most frequent mood; ties go to the one seen first.
    pub fn top(&self) -> Option<Mood> {
        self.ranked().first().map(|(m, _)| *m)
    }

    /// Moods by descending count, ties in first-encountered order.
    pub fn ranked(&self) -> Vec<(Mood, u32)> {
        let mut ranked = self.counts.clone();
        // Stable sort keeps encounter order within equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl Serialize for MoodTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (mood, count) in &self.counts {
            map.serialize_entry(mood.as_str(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MoodTally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = MoodTally;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of mood tags to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MoodTally, A::Error> {
                let mut tally = MoodTally::default();
                while let Some((tag, count)) = access.next_entry::<String, u32>()? {
                    match tag.parse::<Mood>() {
                        Ok(mood) => match tally.counts.iter_mut().find(|(m, _)| *m == mood) {
                            Some((_, total)) => *total += count,
                            None => tally.counts.push((mood, count)),
                        },
                        Err(err) => tracing::warn!(%err, "dropping unknown mood from tally"),
                    }
                }
                Ok(tally)
            }
        }

        deserializer.deserialize_map(TallyVisitor)
    }
}

/// Journaled days falling on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub name: String,
    pub short: String,
    pub count: u32,
}

/// Unique journaling dates per weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayOfWeekBreakdown {
    counts: [u32; 7],
}

impl DayOfWeekBreakdown {
    pub fn from_dates(dates: &BTreeSet<NaiveDate>) -> Self {
        let mut counts = [0u32; 7];
        for date in dates {
            counts[date.weekday().num_days_from_sunday() as usize] += 1;
        }
        Self { counts }
    }

    /// Count for a weekday index, 0 = Sunday.
    pub fn count(&self, index: usize) -> u32 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// All seven weekdays, Sunday first, zero counts included.
    pub fn days(&self) -> Vec<DayCount> {
        WEEKDAY_NAMES
            .iter()
            .zip(self.counts)
            .map(|(name, count)| DayCount {
                name: name.to_string(),
                short: name[..3].to_string(),
                count,
            })
            .collect()
    }

    /// Weekday with the highest count; ties go to the earliest index.
    pub fn peak(&self) -> &'static str {
        let mut best = 0;
        for (idx, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = idx;
            }
        }
        WEEKDAY_NAMES[best]
    }
}

/// Journaled days in one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: u32,
}

/// Unique journaling dates per month, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyActivity {
    months: Vec<MonthCount>,
}

impl MonthlyActivity {
    pub fn from_dates(dates: &BTreeSet<NaiveDate>) -> Self {
        let mut by_month: BTreeMap<(i32, u32), u32> = BTreeMap::new();
        for date in dates {
            *by_month.entry((date.year(), date.month())).or_default() += 1;
        }

        let months = by_month
            .into_iter()
            .map(|((year, month), count)| MonthCount {
                month: format!("{:04}-{:02}", year, month),
                count,
            })
            .collect();

        Self { months }
    }

    pub fn months(&self) -> &[MonthCount] {
        &self.months
    }

    pub fn total(&self) -> u32 {
        self.months.iter().map(|m| m.count).sum()
    }

    /// Month key with the highest count; ties go to the earliest month.
    /// Empty string when there are no months.
    pub fn peak(&self) -> String {
        self.months
            .iter()
            .fold(None::<&MonthCount>, |best, m| match best {
                Some(b) if b.count >= m.count => Some(b),
                _ => Some(m),
            })
            .map(|m| m.month.clone())
            .unwrap_or_default()
    }

    pub fn into_months(self) -> Vec<MonthCount> {
        self.months
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn set(dates: &[&str]) -> BTreeSet<NaiveDate> {
        dates.iter().map(|s| date(s)).collect()
    }

    #[test]
    fn test_grade_distribution_buckets() {
        let dist = GradeDistribution::from_grades([8, 8, 6, 10, 1]);
        let buckets = dist.buckets();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0], GradeBucket { grade: 1, count: 1 });
        assert_eq!(buckets[7], GradeBucket { grade: 8, count: 2 });
        assert_eq!(buckets[9], GradeBucket { grade: 10, count: 1 });
        assert_eq!(dist.total(), 5);
    }

    #[test]
    fn test_grade_distribution_ignores_out_of_range() {
        let dist = GradeDistribution::from_grades([0, 11, 255, 5]);
        assert_eq!(dist.total(), 1);
        assert_eq!(dist.count(5), 1);
        assert_eq!(dist.count(0), 0);
    }

    #[test]
    fn test_mood_tally_first_encountered_wins_ties() {
        let tally = MoodTally::from_moods([Mood::Sad, Mood::Happy, Mood::Happy, Mood::Sad]);
        assert_eq!(tally.top(), Some(Mood::Sad));
        assert_eq!(tally.get(Mood::Happy), 2);
        assert_eq!(tally.get(Mood::Angry), 0);
    }

    #[test]
    fn test_mood_tally_ranked() {
        let tally = MoodTally::from_moods([
            Mood::Loved,
            Mood::Happy,
            Mood::Happy,
            Mood::Angry,
            Mood::Scared,
        ]);
        let ranked: Vec<Mood> = tally.ranked().into_iter().map(|(m, _)| m).collect();
        assert_eq!(ranked, vec![Mood::Happy, Mood::Loved, Mood::Angry, Mood::Scared]);
    }

    #[test]
    fn test_mood_tally_empty() {
        let tally = MoodTally::default();
        assert!(tally.is_empty());
        assert_eq!(tally.top(), None);
    }

    #[test]
    fn test_mood_tally_reads_back_in_order() {
        let tally: MoodTally =
            serde_json::from_str(r#"{"sad":2,"happy":1,"bored":4}"#).unwrap();
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![(Mood::Sad, 2), (Mood::Happy, 1)]);
        assert_eq!(tally.top(), Some(Mood::Sad));
    }

    #[test]
    fn test_mood_tally_serializes_in_encounter_order() {
        let tally = MoodTally::from_moods([Mood::Sad, Mood::Happy, Mood::Sad]);
        let json = serde_json::to_string(&tally).unwrap();
        insta::assert_snapshot!(json, @r#"{"sad":2,"happy":1}"#);
    }

    #[test]
    fn test_day_of_week_uses_calendar_weekday() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday.
        let dates = set(&["2024-01-07", "2024-01-08", "2024-01-14"]);
        let dow = DayOfWeekBreakdown::from_dates(&dates);
        let days = dow.days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].name, "Sunday");
        assert_eq!(days[0].short, "Sun");
        assert_eq!(days[0].count, 2);
        assert_eq!(days[1].count, 1);
        assert_eq!(days[6].count, 0);
        assert_eq!(dow.peak(), "Sunday");
        assert_eq!(dow.total(), 3);
    }

    #[test]
    fn test_day_of_week_tie_goes_to_sunday_first_order() {
        // Tuesday and Saturday once each.
        let dates = set(&["2024-01-09", "2024-01-13"]);
        assert_eq!(DayOfWeekBreakdown::from_dates(&dates).peak(), "Tuesday");
    }

    #[test]
    fn test_monthly_activity_sorted_and_peak() {
        let dates = set(&["2024-03-01", "2023-12-31", "2024-03-02", "2024-01-15", "2024-01-16"]);
        let monthly = MonthlyActivity::from_dates(&dates);
        let keys: Vec<&str> = monthly.months().iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(monthly.total(), 5);
        assert_eq!(monthly.peak(), "2024-01");
    }

    #[test]
    fn test_monthly_peak_empty() {
        assert_eq!(MonthlyActivity::default().peak(), "");
    }
}
