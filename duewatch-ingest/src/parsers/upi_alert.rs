//! UPI debit alert mails (text)
//!
//! Expected decoded text:
//!   Dear Customer, Rs.250.00 has been debited from account **1234 to VPA
//!   swiggy@icici on 05-06-25. Your UPI transaction reference number is ...

use chrono::NaiveDate;
use duewatch_core::{Amount, TransactionRecord};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFields {
    pub amount: Option<Amount>,
    pub date: Option<NaiveDate>,
}

impl TransactionFields {
    pub fn into_record(self) -> Option<TransactionRecord> {
        Some(TransactionRecord {
            date: self.date?,
            amount: self.amount?,
        })
    }
}

fn rs_amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Rs\.? ?([0-9,]+\.\d{2})").expect("invalid amount regex"))
}

fn on_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Trailing \b keeps "on 05-06-2025" from reading as year 20.
    RE.get_or_init(|| Regex::new(r"on (\d{2})-(\d{2})-(\d{2})\b").expect("invalid date regex"))
}

pub fn extract_transaction_amount(text: &str) -> Option<Amount> {
    let caps = rs_amount_re().captures(text)?;
    Amount::parse(&caps[1])
}

/// `DD-MM-YY`, always in the 2000s.
pub fn extract_transaction_date(text: &str) -> Option<NaiveDate> {
    let caps = on_date_re().captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let yy: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + yy, month, day)
}

pub fn extract_transaction_fields(text: &str) -> TransactionFields {
    TransactionFields {
        amount: extract_transaction_amount(text),
        date: extract_transaction_date(text),
    }
}
