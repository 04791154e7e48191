//! Entry retrieval seam.

use crate::aggregate::{compute_stats, StatsOptions};
use crate::entry::Entry;
use crate::range::DateRange;
use crate::report::StatsReport;

/// Anything that can hand out one journal's entries for a date range.
pub trait EntrySource {
    type Error;

    /// Entries whose date falls in `range`, oldest first.
    fn entries_in(&self, range: &DateRange) -> Result<Vec<Entry>, Self::Error>;
}

/// Read the entries in `options.range` from `source` and compute their stats.
pub fn stats_from_source<S: EntrySource + ?Sized>(
    source: &S,
    options: &StatsOptions,
) -> Result<Option<StatsReport>, S::Error> {
    let entries = source.entries_in(&options.range)?;
    Ok(compute_stats(&entries, options))
}

impl EntrySource for [Entry] {
    type Error = std::convert::Infallible;

    fn entries_in(&self, range: &DateRange) -> Result<Vec<Entry>, Self::Error> {
        let mut entries: Vec<Entry> = self.iter().filter(|e| range.contains(e.date)).cloned().collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct FailingSource;

    impl EntrySource for FailingSource {
        type Error = String;

        fn entries_in(&self, _range: &DateRange) -> Result<Vec<Entry>, Self::Error> {
            Err("store offline".to_string())
        }
    }

    #[test]
    fn test_slice_source_filters_and_sorts() {
        let entries = vec![
            Entry::new(date("2024-01-05")),
            Entry::new(date("2024-01-01")),
            Entry::new(date("2024-02-01")),
        ];
        let range = DateRange::new(None, Some(date("2024-01-31")));
        let found = entries.as_slice().entries_in(&range).unwrap();
        let dates: Vec<NaiveDate> = found.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-05")]);
    }

    #[test]
    fn test_stats_from_source() {
        let entries = vec![Entry::new(date("2024-01-01")).with_grade(9)];
        let options = StatsOptions::new(date("2024-01-01"));
        let report = stats_from_source(entries.as_slice(), &options).unwrap().unwrap();
        assert_eq!(report.best_grade, Some(9));
    }

    #[test]
    fn test_source_error_propagates() {
        let options = StatsOptions::new(date("2024-01-01"));
        let err = stats_from_source(&FailingSource, &options).unwrap_err();
        assert_eq!(err, "store offline");
    }
}
