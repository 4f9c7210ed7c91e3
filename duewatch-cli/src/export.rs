use anyhow::{Context, Result};
use duewatch_core::SpendSummary;
use std::io::Write;
use std::path::Path;

/// `date,amount` rows, one per day, oldest first.
pub fn write_spend_csv<W: Write>(out: W, spend: &SpendSummary) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(["date", "amount"])?;
    for (date, amount) in spend.iter() {
        w.write_record([date.format("%Y-%m-%d").to_string(), amount.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_spend_csv(p: &Path, spend: &SpendSummary) -> Result<()> {
    let f = std::fs::File::create(p).with_context(|| format!("create {}", p.display()))?;
    write_spend_csv(f, spend).with_context(|| format!("write {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use duewatch_core::{Amount, TransactionRecord};

    #[test]
    fn test_rows_sorted_by_date_without_grouping() {
        let mut spend = SpendSummary::new();
        for (day, amt) in [(7, "75.00"), (5, "1,000.50"), (5, "250.00")] {
            spend.add(TransactionRecord {
                date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
                amount: Amount::parse(amt).unwrap(),
            });
        }
        let mut buf = Vec::new();
        write_spend_csv(&mut buf, &spend).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,amount\n2025-06-05,1250.50\n2025-06-07,75.00\n"
        );
    }
}
