//! Report assembly: one fold over the entries, then each builder once.

use crate::distribution::{DayOfWeekBreakdown, GradeDistribution, MonthlyActivity, MoodTally};
use crate::entry::Entry;
use crate::heatmap::Heatmap;
use crate::range::DateRange;
use crate::report::StatsReport;
use crate::streak::Streaks;
use crate::{mean1, round1};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Trailing heatmap window: thirteen weeks.
pub const DEFAULT_HEATMAP_DAYS: u32 = 91;

/// Inputs besides the entries themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub range: DateRange,
    /// Anchor for the current streak and the heatmap window.
    pub today: NaiveDate,
    pub heatmap_days: u32,
}

impl StatsOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            range: DateRange::all(),
            today,
            heatmap_days: DEFAULT_HEATMAP_DAYS,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_heatmap_days(mut self, days: u32) -> Self {
        self.heatmap_days = days;
        self
    }
}

/// Per-date totals gathered during the fold.
#[derive(Debug, Clone, Copy, Default)]
struct DayTotals {
    entries: u32,
    words: u64,
}

/// Running totals for a single pass over the entries.
#[derive(Debug, Default)]
struct Accumulator {
    entries: u32,
    words: u64,
    sentences: u64,
    chars: u64,
    comments: u64,
    attachments: u64,
    versions: u64,
    grade_sum: u64,
    grade_count: u64,
    best_grade: Option<u8>,
    worst_grade: Option<u8>,
    grades: GradeDistribution,
    moods: MoodTally,
    days: BTreeMap<NaiveDate, DayTotals>,
}

impl Accumulator {
    fn absorb(mut self, entry: &Entry) -> Self {
        let metrics = entry.metrics();

        self.entries += 1;
        self.words += metrics.words as u64;
        self.sentences += metrics.sentences as u64;
        self.chars += metrics.chars as u64;
        self.comments += entry.comments.len() as u64;
        self.attachments += entry.attachments.len() as u64;
        self.versions += entry.versions.len() as u64;

        match entry.grade() {
            Some(grade) => {
                self.grade_sum += u64::from(grade);
                self.grade_count += 1;
                self.best_grade = Some(self.best_grade.map_or(grade, |b| b.max(grade)));
                self.worst_grade = Some(self.worst_grade.map_or(grade, |w| w.min(grade)));
                self.grades.record(grade);
            }
            None => {
                if let Some(raw) = entry.grade {
                    tracing::warn!(entry = entry.id, grade = raw, "skipping out-of-range grade");
                }
            }
        }

        if let Some(mood) = entry.mood {
            self.moods.record(mood);
        }

        let day = self.days.entry(entry.date).or_default();
        day.entries += 1;
        day.words += metrics.words as u64;

        self
    }

    fn finish(self, options: &StatsOptions) -> Option<StatsReport> {
        let first_entry_date = *self.days.keys().next()?;
        let last_entry_date = *self.days.keys().next_back()?;

        let dates: BTreeSet<NaiveDate> = self.days.keys().copied().collect();
        let days_journaled = dates.len() as u32;

        let streaks = Streaks::compute(&dates, options.today);
        let dow = DayOfWeekBreakdown::from_dates(&dates);
        let monthly = MonthlyActivity::from_dates(&dates);
        let heatmap = Heatmap::build(
            self.days.iter().map(|(date, day)| (*date, day.words)),
            options.today,
            options.heatmap_days,
        );
        let max_entries_in_day = self.days.values().map(|d| d.entries).max().unwrap_or(0);

        let per_entry = |total: u64| -> u64 {
            if self.entries == 0 {
                0
            } else {
                (total as f64 / f64::from(self.entries)).round() as u64
            }
        };

        Some(StatsReport {
            total_entries: self.entries,
            days_journaled,
            total_words: self.words,
            total_sentences: self.sentences,
            total_chars: self.chars,
            avg_words_per_entry: per_entry(self.words),
            avg_sentences_per_entry: per_entry(self.sentences),
            total_comments: self.comments,
            total_attachments: self.attachments,
            total_versions: self.versions,
            average_grade: mean1(self.grade_sum, self.grade_count),
            best_grade: self.best_grade,
            worst_grade: self.worst_grade,
            grade_distribution: self.grades.buckets(),
            top_mood: self.moods.top(),
            mood_freq: self.moods,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            peak_day: dow.peak().to_string(),
            dow_breakdown: dow.days(),
            peak_month: monthly.peak(),
            monthly_activity: monthly.into_months(),
            first_entry_date,
            last_entry_date,
            heatmap,
            max_entries_in_day,
            avg_entries_per_active_day: round1(f64::from(self.entries) / f64::from(days_journaled)),
        })
    }
}

/// Compute the stats report for the entries inside `options.range`.
///
/// Returns `None` when no entry falls in the range: "no data for the
/// period", not an error.
pub fn compute_stats(entries: &[Entry], options: &StatsOptions) -> Option<StatsReport> {
    let acc = entries
        .iter()
        .filter(|e| options.range.contains(e.date))
        .fold(Accumulator::default(), Accumulator::absorb);

    tracing::debug!(
        supplied = entries.len(),
        matched = acc.entries,
        range = %options.range,
        "computing journal stats"
    );

    acc.finish(options)
}
