//! Billing window: the range over which UPI spend is reported.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range. `start > end` is a valid, empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// First day after the window, for exclusive upper-bound queries.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end.checked_add_days(Days::new(1)).unwrap_or(self.end)
    }
}

/// What capped the upper end of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpperBound {
    Today,
    LatestDueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingWindow {
    pub window: DateWindow,
    pub upper: UpperBound,
}

impl BillingWindow {
    pub fn note(&self) -> String {
        match self.upper {
            UpperBound::Today => format!("UPI transactions shown till today ({})", self.window.end),
            UpperBound::LatestDueDate => format!(
                "UPI transactions shown only till the last credit card due date ({})",
                self.window.end
            ),
        }
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// From the first of `today`'s month to `today`, capped at the latest due date.
///
/// With no due dates at all the window simply ends today.
pub fn billing_window(today: NaiveDate, due_dates: impl IntoIterator<Item = NaiveDate>) -> BillingWindow {
    let start = month_start(today);
    match due_dates.into_iter().max() {
        Some(latest) if today > latest => BillingWindow {
            window: DateWindow::new(start, latest),
            upper: UpperBound::LatestDueDate,
        },
        _ => BillingWindow {
            window: DateWindow::new(start, today),
            upper: UpperBound::Today,
        },
    }
}
