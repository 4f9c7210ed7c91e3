//! Dashboard snapshot: dues versus what is left after UPI spend.

use serde::Serialize;

use crate::amount::{Amount, format_minor_grouped};
use crate::bill::BillSummary;
use crate::spend::SpendSummary;

/// How comfortably the remaining balance covers card dues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JarStatus {
    /// Net balance above 150% of dues.
    Green,
    /// Between 110% and 150%.
    Amber,
    /// Below 110%.
    Red,
}

impl JarStatus {
    /// Compare in integer minor units: net > 1.5 × due ⇔ 10·net > 15·due.
    pub fn assess(net_minor: i128, due: Amount) -> Self {
        let due = due.minor() as i128;
        if net_minor * 10 > due * 15 {
            JarStatus::Green
        } else if net_minor * 10 > due * 11 {
            JarStatus::Amber
        } else {
            JarStatus::Red
        }
    }

    /// Jar fill level in percent.
    pub fn fill_level(&self) -> u8 {
        match self {
            JarStatus::Green => 80,
            JarStatus::Amber => 45,
            JarStatus::Red => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub balance: Amount,
    pub total_due: Amount,
    pub total_spend: Amount,
    /// balance − spend, may be negative.
    pub net_available_minor: i128,
    pub status: JarStatus,
}

impl DashboardSnapshot {
    pub fn build(balance: Amount, bills: &BillSummary, spend: &SpendSummary) -> Self {
        let total_due = bills.total_due();
        let total_spend = spend.total();
        let net_available_minor = balance.minor() as i128 - total_spend.minor() as i128;
        Self {
            balance,
            total_due,
            total_spend,
            net_available_minor,
            status: JarStatus::assess(net_available_minor, total_due),
        }
    }

    pub fn net_available(&self) -> String {
        format_minor_grouped(self.net_available_minor)
    }

    pub fn advice(&self) -> String {
        let net = self.net_available();
        match self.status {
            JarStatus::Green => format!(
                "You have ₹{net} left after UPI spending. This is more than enough."
            ),
            JarStatus::Amber => format!(
                "You have ₹{net} left after UPI spending. This may be enough but is cutting close."
            ),
            JarStatus::Red => format!(
                "You have only ₹{net} left after UPI spending. Urgent action needed!"
            ),
        }
    }
}
