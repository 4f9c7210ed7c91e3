//! Gmail search strings. We only format them; the grammar is the provider's.

use crate::window::DateWindow;

const GMAIL_DATE: &str = "%Y/%m/%d";

/// `subject:("Credit Card Statement") newer_than:60d`
pub fn statement_query(subject: &str, newer_than_days: u32) -> String {
    format!(
        "subject:(\"{}\") newer_than:{}d",
        sanitize(subject),
        newer_than_days
    )
}

/// Gmail's `before:` is exclusive, so it gets the day after the window end.
pub fn spend_query(subject: &str, window: &DateWindow) -> String {
    format!(
        "subject:\"{}\" after:{} before:{}",
        sanitize(subject),
        window.start.format(GMAIL_DATE),
        window.end_exclusive().format(GMAIL_DATE)
    )
}

fn sanitize(subject: &str) -> String {
    subject.replace('"', "").trim().to_string()
}
