//! Credit-card statement mails (text)
//!
//! Expected decoded text, in any order and with arbitrary filler:
//!   ... Total Amount Due Rs. 12,345.67 ... Payment Due Date 15-07-2025 ...
//!
//! Statements vary in phrasing, so the due date falls back to the first bare
//! `DD-MM-YYYY` / `DD/MM/YYYY` anywhere in the text.

use chrono::NaiveDate;
use duewatch_core::{Amount, BillRecord, Issuer};
use regex::{Captures, Regex};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillFields {
    pub amount: Option<Amount>,
    pub due_date: Option<NaiveDate>,
}

impl BillFields {
    /// A record only exists when both fields were found.
    pub fn into_record(self, issuer: Issuer) -> Option<BillRecord> {
        Some(BillRecord {
            issuer,
            amount: self.amount?,
            due_date: self.due_date?,
        })
    }
}

fn total_due_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)total\s+amount\s+due.*?[₹Rs. ]*([0-9,]+\.\d{2})")
            .expect("invalid total due regex")
    })
}

fn payment_due_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)payment\s+due\s+date.*?(\d{2})[-/](\d{2})[-/](\d{4})")
            .expect("invalid payment due date regex")
    })
}

fn bare_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2})[-/](\d{2})[-/](\d{4})").expect("invalid date regex"))
}

/// `(DD, MM, YYYY)` capture groups 1..=3 to a calendar date.
fn dmy(caps: &Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn extract_bill_amount(text: &str) -> Option<Amount> {
    let caps = total_due_re().captures(text)?;
    Amount::parse(&caps[1])
}

pub fn extract_due_date(text: &str) -> Option<NaiveDate> {
    payment_due_date_re()
        .captures(text)
        .and_then(|caps| dmy(&caps))
        .or_else(|| bare_date_re().captures(text).and_then(|caps| dmy(&caps)))
}

pub fn extract_bill_fields(text: &str) -> BillFields {
    BillFields {
        amount: extract_bill_amount(text),
        due_date: extract_due_date(text),
    }
}
