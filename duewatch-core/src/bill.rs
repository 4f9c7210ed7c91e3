//! Credit-card bills: issuers, bill records and the per-issuer summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::amount::Amount;

/// The card products we know how to read statements for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Issuer {
    DinersClub,
    RupayCard,
    PixelCard,
}

impl Issuer {
    pub fn display_name(&self) -> &'static str {
        match self {
            Issuer::DinersClub => "Diners Club",
            Issuer::RupayCard => "RuPay Card",
            Issuer::PixelCard => "Pixel Card",
        }
    }
}

impl fmt::Display for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One complete statement: both amount and due date were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub issuer: Issuer,
    pub amount: Amount,
    pub due_date: NaiveDate,
}

/// Latest bill per issuer.
///
/// At most one record per issuer; a stored record is only replaced by one whose
/// due date is strictly later.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillSummary {
    bills: BTreeMap<Issuer, BillRecord>,
}

impl BillSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record. Returns true if it was stored.
    pub fn offer(&mut self, record: BillRecord) -> bool {
        match self.bills.get(&record.issuer) {
            Some(existing) if record.due_date <= existing.due_date => false,
            _ => {
                self.bills.insert(record.issuer, record);
                true
            }
        }
    }

    pub fn get(&self, issuer: Issuer) -> Option<&BillRecord> {
        self.bills.get(&issuer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BillRecord> {
        self.bills.values()
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    pub fn due_dates(&self) -> Vec<NaiveDate> {
        self.bills.values().map(|b| b.due_date).collect()
    }

    pub fn latest_due_date(&self) -> Option<NaiveDate> {
        self.bills.values().map(|b| b.due_date).max()
    }

    pub fn total_due(&self) -> Amount {
        self.bills.values().map(|b| b.amount).sum()
    }
}

/// Folds bill records into a [`BillSummary`].
pub struct BillAggregator;

impl BillAggregator {
    pub fn aggregate(records: impl IntoIterator<Item = BillRecord>) -> BillSummary {
        let mut summary = BillSummary::new();
        for record in records {
            summary.offer(record);
        }
        summary
    }
}
