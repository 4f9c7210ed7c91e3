//! duewatch-ingest: mail payload decoding, field extraction and the fetch pipeline.

pub mod decode;
pub mod error;
pub mod mail;
pub mod parsers;
pub mod pipeline;
pub mod types;

pub use decode::{MessageBodyDecoder, PartScan, decode_base64url, html_to_text};
pub use error::{MailError, Result};
pub use mail::{MailClient, Profile};
pub use parsers::{BillFields, TransactionFields, extract_bill_fields, extract_transaction_fields};
pub use pipeline::{BillPlan, BillReport, Pipeline, SpendPlan, SpendReport};
pub use types::{Header, MessagePart, PartBody, RawMessage};
