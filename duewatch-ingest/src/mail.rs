//! The mail provider surface the pipeline depends on.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::RawMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email_address: String,
    #[serde(default)]
    pub messages_total: Option<u64>,
}

/// Calls are made one at a time; implementations need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait MailClient {
    /// Ids of messages matching `query`, newest first, at most `max_results`.
    async fn list_messages(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    async fn get_message(&self, id: &str) -> Result<RawMessage>;

    async fn get_profile(&self) -> Result<Profile>;
}
