//! Gmail REST client backing the `MailClient` seam.
//!
//! Endpoints used (relative to `gmail.api_base`):
//!
//! ```text
//! GET users/{user}/messages?q=...&maxResults=N[&pageToken=...]
//! GET users/{user}/messages/{id}?format=full
//! GET users/{user}/profile
//! ```

use chrono::Utc;
use duewatch_ingest::{MailClient, MailError, Profile, RawMessage, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::GmailSection;
use crate::credential::Credential;

/// Largest page Gmail accepts for a message listing.
const MAX_PAGE_SIZE: usize = 500;

/// Owns the credential for the run and refreshes it when the access token
/// runs out or Gmail answers 401. Calls are sequential, so a `RefCell` is
/// enough.
pub struct GmailClient {
    http: reqwest::Client,
    api_base: String,
    user_id: String,
    credential: RefCell<Credential>,
    store: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

impl GmailClient {
    pub fn new(http: reqwest::Client, cfg: &GmailSection, credential: Credential) -> Self {
        Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            user_id: cfg.user_id.clone(),
            credential: RefCell::new(credential),
            store: None,
        }
    }

    /// Write refreshed tokens back to this file.
    pub fn persist_refreshes_to(mut self, path: PathBuf) -> Self {
        self.store = Some(path);
        self
    }

    pub fn credential(&self) -> Credential {
        self.credential.borrow().clone()
    }

    /// A usable access token, refreshing first when `force` is set or the
    /// stored one has expired.
    async fn access_token(&self, force: bool) -> Result<String> {
        let current = self.credential();
        if !force && current.is_valid(Utc::now()) {
            return Ok(current.access_token);
        }
        if !current.can_refresh() {
            return Err(MailError::Auth("access token expired".to_string()));
        }

        let mut fresh = current;
        fresh.refresh(&self.http).await?;
        if let Some(path) = &self.store
            && let Err(e) = fresh.save(path)
        {
            warn!("could not persist refreshed credential: {e:#}");
        }
        let token = fresh.access_token.clone();
        *self.credential.borrow_mut() = fresh;
        Ok(token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/users/{}/{}", self.api_base, self.user_id, path);
        let mut token = self.access_token(false).await?;
        let mut retried = false;

        loop {
            let resp = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(params)
                .send()
                .await
                .map_err(|e| MailError::Transport(e.to_string()))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED && !retried && self.credential.borrow().can_refresh() {
                debug!(%path, "access token rejected, refreshing once");
                token = self.access_token(true).await?;
                retried = true;
                continue;
            }
            if !status.is_success() {
                let txt = resp.text().await.unwrap_or_default();
                return Err(classify_failure(status, &txt));
            }
            return resp
                .json::<T>()
                .await
                .map_err(|e| MailError::Payload(format!("{path}: {e}")));
        }
    }
}

impl MailClient for GmailClient {
    async fn list_messages(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        while ids.len() < max_results {
            let page_size = (max_results - ids.len()).min(MAX_PAGE_SIZE);
            let mut params = vec![("q", query.to_string()), ("maxResults", page_size.to_string())];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: MessageList = self.get_json("messages", &params).await?;
            debug!(page = page.messages.len(), more = page.next_page_token.is_some(), "listed message page");
            ids.extend(page.messages.into_iter().take(page_size).map(|m| m.id));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(ids)
    }

    async fn get_message(&self, id: &str) -> Result<RawMessage> {
        self.get_json(&format!("messages/{id}"), &[("format", "full".to_string())])
            .await
    }

    async fn get_profile(&self) -> Result<Profile> {
        self.get_json("profile", &[]).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// 401 and permission-denied 403s are credential problems; quota 403s and
/// everything else are plain API failures.
fn classify_failure(status: StatusCode, body: &str) -> MailError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = match &parsed {
        Some(err) if !err.message.is_empty() => err.message.clone(),
        _ => body.trim().to_string(),
    };
    let permission_denied = parsed.as_ref().is_some_and(|e| e.status == "PERMISSION_DENIED");

    if status == StatusCode::UNAUTHORIZED || (status == StatusCode::FORBIDDEN && permission_denied) {
        MailError::Auth(format!("{status}: {message}"))
    } else {
        MailError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
