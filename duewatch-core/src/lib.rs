//! duewatch-core: bill and spend domain types, aggregation and billing windows

pub mod amount;
pub mod bill;
pub mod dashboard;
pub mod query;
pub mod rules;
pub mod spend;
pub mod window;

pub use amount::Amount;
pub use bill::{BillAggregator, BillRecord, BillSummary, Issuer};
pub use dashboard::{DashboardSnapshot, JarStatus};
pub use rules::{ExclusionKeywords, IssuerRule, IssuerRules};
pub use spend::{SpendAggregator, SpendCandidate, SpendStats, SpendSummary, TransactionRecord};
pub use window::{BillingWindow, DateWindow, UpperBound, billing_window};
