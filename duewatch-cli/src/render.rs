//! Plain-text rendering for the terminal.
//!
//! Everything returns a `String` so `main` decides where it goes.

use duewatch_core::{BillSummary, BillingWindow, DashboardSnapshot, SpendSummary};
use std::fmt::Write;

pub const NO_BILLS: &str = "No credit card bills found.";
pub const NO_SPEND: &str = "No UPI transactions found for the selected period.";

pub fn bills_table(bills: &BillSummary) -> String {
    if bills.is_empty() {
        return format!("{NO_BILLS}\n");
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<14} {:>14}  {}", "Card", "Amount (₹)", "Due date");
    for bill in bills.iter() {
        let _ = writeln!(
            out,
            "{:<14} {:>14}  {}",
            bill.issuer.display_name(),
            bill.amount.grouped(),
            bill.due_date.format("%d %b %Y")
        );
    }
    let _ = writeln!(out, "{:<14} {:>14}", "Total", bills.total_due().grouped());
    out
}

pub fn spend_table(window: &BillingWindow, spend: &SpendSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", window.note());
    if spend.is_empty() {
        let _ = writeln!(out, "{NO_SPEND}");
        return out;
    }
    let _ = writeln!(out, "{:<12} {:>14}", "Date", "Spent (₹)");
    for (date, amount) in spend.iter() {
        let _ = writeln!(out, "{:<12} {:>14}", date.format("%Y-%m-%d"), amount.grouped());
    }
    let _ = writeln!(out, "{:<12} {:>14}", "Total", spend.total().grouped());
    out
}

pub fn dashboard(account: &str, snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Gmail account in use: {account}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Bank balance:        ₹{}", snapshot.balance.grouped());
    let _ = writeln!(out, "Total card dues:     ₹{}", snapshot.total_due.grouped());
    let _ = writeln!(out, "UPI spend (window):  ₹{}", snapshot.total_spend.grouped());
    let _ = writeln!(out, "Net available:       ₹{}", snapshot.net_available());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Jar: {:?} ({}% full) {}",
        snapshot.status,
        snapshot.status.fill_level(),
        jar_bar(snapshot.status.fill_level())
    );
    let _ = writeln!(out, "{}", snapshot.advice());
    out
}

/// Ten-cell bar, one cell per 10%.
fn jar_bar(fill: u8) -> String {
    let cells = usize::from(fill.min(100) / 10);
    format!("[{}{}]", "#".repeat(cells), ".".repeat(10 - cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use duewatch_core::{Amount, BillAggregator, BillRecord, Issuer, TransactionRecord, billing_window};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bills() -> BillSummary {
        BillAggregator::aggregate([
            BillRecord {
                issuer: Issuer::PixelCard,
                amount: Amount::parse("12,345.67").unwrap(),
                due_date: d(2025, 6, 28),
            },
            BillRecord {
                issuer: Issuer::DinersClub,
                amount: Amount::parse("4,500.00").unwrap(),
                due_date: d(2025, 6, 24),
            },
        ])
    }

    #[test]
    fn test_bills_table_lists_each_issuer_and_total() {
        let out = bills_table(&bills());
        assert!(out.contains("Diners Club"));
        assert!(out.contains("12,345.67"));
        assert!(out.contains("28 Jun 2025"));
        assert!(out.lines().last().unwrap().contains("16,845.67"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(bills_table(&BillSummary::new()).trim(), NO_BILLS);
        let window = billing_window(d(2025, 6, 25), [d(2025, 6, 28)]);
        let out = spend_table(&window, &SpendSummary::new());
        assert!(out.contains("till today (2025-06-25)"));
        assert!(out.contains(NO_SPEND));
    }

    #[test]
    fn test_dashboard_shows_jar_and_advice() {
        let mut spend = SpendSummary::new();
        spend.add(TransactionRecord {
            date: d(2025, 6, 5),
            amount: Amount::parse("1,000.00").unwrap(),
        });
        let snapshot = DashboardSnapshot::build(Amount::parse("50,000.00").unwrap(), &bills(), &spend);
        let out = dashboard("me@example.com", &snapshot);
        assert!(out.contains("me@example.com"));
        assert!(out.contains("₹49,000.00"));
        assert!(out.contains("80% full"));
        assert!(out.contains("[########..]"));
        assert!(out.contains("more than enough"));
    }

    #[test]
    fn test_jar_bar_clamps() {
        assert_eq!(jar_bar(10), "[#.........]");
        assert_eq!(jar_bar(255), "[##########]");
    }
}
