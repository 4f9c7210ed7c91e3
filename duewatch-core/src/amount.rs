//! Currency amounts held as integer minor units (paise).
//!
//! Statement mails print amounts as `12,345.67`; we only ever accept values with
//! exactly two fractional digits, so the value round-trips without float error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A non-negative currency value with exactly two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount {
    minor: u64,
}

impl Amount {
    pub const ZERO: Amount = Amount { minor: 0 };

    pub fn from_minor(minor: u64) -> Self {
        Self { minor }
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Parse `1,234.56` style text. Commas are dropped; anything other than
    /// digits, one `.` and two decimals yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
        let (whole, frac) = cleaned.split_once('.')?;
        if whole.is_empty() || frac.len() != 2 {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: u64 = whole.parse().ok()?;
        let frac: u64 = frac.parse().ok()?;
        let minor = whole.checked_mul(100)?.checked_add(frac)?;
        Some(Self { minor })
    }

    /// Thousands-grouped rendering, e.g. `1,234,567.89`.
    pub fn grouped(&self) -> String {
        format_minor_grouped(self.minor as i128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.minor / 100, self.minor % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount {
            minor: self.minor.saturating_add(rhs.minor),
        }
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

/// Grouped rendering for signed minor units (balances can go negative).
pub fn format_minor_grouped(minor: i128) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let whole = (abs / 100).to_string();
    let frac = abs % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac:02}")
}
