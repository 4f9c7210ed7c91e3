//! Field extraction from decoded mail text.
//!
//! Pure functions: text in, optional fields out. Missing fields are `None`,
//! never an error.

pub mod statement;
pub mod upi_alert;

pub use statement::{BillFields, extract_bill_fields};
pub use upi_alert::{TransactionFields, extract_transaction_fields};
