//! Errors from talking to the mail provider.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    /// No usable credential, refresh failed, or the provider rejected it.
    /// Fatal for the whole run.
    #[error("not authenticated with the mail provider: {0}")]
    Auth(String),

    #[error("mail API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response payload: {0}")]
    Payload(String),
}

impl MailError {
    /// True when the run could not even ask, as opposed to "nothing found".
    pub fn is_auth(&self) -> bool {
        matches!(self, MailError::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
