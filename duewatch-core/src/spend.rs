//! Daily UPI spend within a billing window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amount::Amount;
use crate::rules::ExclusionKeywords;
use crate::window::DateWindow;

/// A debit alert with both fields present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: Amount,
}

/// An alert as seen by the aggregator: its source text plus whatever record
/// could be extracted from it.
#[derive(Debug, Clone, Copy)]
pub struct SpendCandidate<'a> {
    pub source_text: &'a str,
    pub record: Option<TransactionRecord>,
}

/// Date → cumulative amount. Only grows during one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendSummary {
    days: BTreeMap<NaiveDate, Amount>,
}

impl SpendSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: TransactionRecord) {
        *self.days.entry(record.date).or_default() += record.amount;
    }

    pub fn get(&self, date: NaiveDate) -> Option<Amount> {
        self.days.get(&date).copied()
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Amount)> + '_ {
        self.days.iter().map(|(d, a)| (*d, *a))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total(&self) -> Amount {
        self.days.values().sum()
    }
}

/// Counts from one aggregation pass, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpendStats {
    pub counted: usize,
    pub excluded: usize,
    pub incomplete: usize,
    pub outside_window: usize,
}

pub struct SpendAggregator {
    exclusions: ExclusionKeywords,
    window: Option<DateWindow>,
}

impl SpendAggregator {
    pub fn new(exclusions: ExclusionKeywords) -> Self {
        Self {
            exclusions,
            window: None,
        }
    }

    /// Drop records dated outside `window`.
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn aggregate<'a>(
        &self,
        candidates: impl IntoIterator<Item = SpendCandidate<'a>>,
    ) -> (SpendSummary, SpendStats) {
        let mut summary = SpendSummary::new();
        let mut stats = SpendStats::default();

        for candidate in candidates {
            // Exclusion is decided on text alone, before looking at the fields.
            if self.exclusions.excludes(candidate.source_text) {
                stats.excluded += 1;
                continue;
            }
            let Some(record) = candidate.record else {
                stats.incomplete += 1;
                continue;
            };
            if let Some(window) = &self.window
                && !window.contains(record.date)
            {
                stats.outside_window += 1;
                continue;
            }
            summary.add(record);
            stats.counted += 1;
        }

        (summary, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(day: u32, minor: u64) -> Option<TransactionRecord> {
        Some(TransactionRecord {
            date: d(2025, 6, day),
            amount: Amount::from_minor(minor),
        })
    }

    #[test]
    fn test_sums_per_day() {
        let agg = SpendAggregator::new(ExclusionKeywords::default());
        let (summary, stats) = agg.aggregate([
            SpendCandidate { source_text: "Rs.100.00 to swiggy", record: rec(3, 10_000) },
            SpendCandidate { source_text: "Rs.50.50 to zomato", record: rec(3, 5_050) },
            SpendCandidate { source_text: "Rs.20.00 to metro", record: rec(4, 2_000) },
        ]);
        assert_eq!(summary.get(d(2025, 6, 3)), Some(Amount::from_minor(15_050)));
        assert_eq!(summary.get(d(2025, 6, 4)), Some(Amount::from_minor(2_000)));
        assert_eq!(summary.total(), Amount::from_minor(17_050));
        assert_eq!(stats.counted, 3);
    }

    #[test]
    fn test_credit_card_text_excluded_regardless_of_fields() {
        let agg = SpendAggregator::new(ExclusionKeywords::default());
        let (summary, stats) = agg.aggregate([
            SpendCandidate { source_text: "Paid to your Credit Card", record: rec(3, 99_900) },
            SpendCandidate { source_text: "CREDIT CARD bill, no amount", record: None },
        ]);
        assert!(summary.is_empty());
        assert_eq!(stats.excluded, 2);
        assert_eq!(stats.incomplete, 0);
    }

    #[test]
    fn test_incomplete_records_skipped() {
        let agg = SpendAggregator::new(ExclusionKeywords::default());
        let (summary, stats) = agg.aggregate([
            SpendCandidate { source_text: "garbled", record: None },
            SpendCandidate { source_text: "ok", record: rec(9, 100) },
        ]);
        assert_eq!(summary.len(), 1);
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn test_window_filter() {
        let agg = SpendAggregator::new(ExclusionKeywords::default())
            .with_window(DateWindow::new(d(2025, 6, 1), d(2025, 6, 10)));
        let (summary, stats) = agg.aggregate([
            SpendCandidate { source_text: "a", record: rec(10, 100) },
            SpendCandidate { source_text: "b", record: rec(11, 100) },
        ]);
        assert_eq!(summary.total(), Amount::from_minor(100));
        assert_eq!(stats.outside_window, 1);
    }

    #[test]
    fn test_empty_input() {
        let agg = SpendAggregator::new(ExclusionKeywords::default());
        let (summary, _) = agg.aggregate(Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.total().to_string(), "0.00");
    }
}
