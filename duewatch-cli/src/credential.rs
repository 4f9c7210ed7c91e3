//! Stored Gmail credential: access token, optional refresh token and expiry.
//!
//! The credential is loaded once per command and moved into the Gmail client,
//! which refreshes it whenever the access token runs out mid-run. Without a
//! refresh token a stale credential stops the command with an authentication
//! error.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use duewatch_ingest::MailError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::state::credential_path;

/// Treat a token as expired slightly before Google does.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Google's token endpoint response, for both code exchange and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|exp| now + Duration::seconds(EXPIRY_SKEW_SECS) >= exp)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Fold a token endpoint response into this credential. A refresh
    /// response usually omits the refresh token; the old one is kept.
    pub fn apply(&mut self, resp: TokenResponse, now: DateTime<Utc>) {
        self.access_token = resp.access_token;
        self.expires_at = resp.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(rt) = resp.refresh_token {
            self.refresh_token = Some(rt);
        }
        if let Some(scope) = resp.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }

    pub async fn refresh(&mut self, http: &reqwest::Client) -> std::result::Result<(), MailError> {
        let refresh_token = self
            .refresh_token
            .clone()
            .ok_or_else(|| MailError::Auth("no refresh token stored".to_string()))?;

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.clone()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let resp = http
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| MailError::Auth(format!("token refresh request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(MailError::Auth(format!("token refresh rejected: {status} {txt}")));
        }
        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| MailError::Auth(format!("token refresh response unreadable: {e}")))?;

        self.apply(body, Utc::now());
        debug!(expires_at = ?self.expires_at, "refreshed gmail access token");
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse stored credential")
    }

    pub fn load(p: &Path) -> Result<Option<Self>> {
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        Self::from_json(&s).map(Some)
    }

    pub fn save(&self, p: &Path) -> Result<()> {
        fs::write(p, self.to_json()?).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }
}

/// Load the stored credential and make sure it is usable right now.
///
/// Every failure here is reported as `MailError::Auth` so callers can tell
/// "not logged in" apart from "nothing found".
pub async fn authorized_credential(http: &reqwest::Client) -> Result<Credential> {
    let path = credential_path()?;
    let stored = Credential::load(&path)
        .map_err(|e| MailError::Auth(format!("stored credential unreadable: {e:#}")))?;
    let Some(mut credential) = stored else {
        return Err(MailError::Auth("no stored credential".to_string()).into());
    };

    if credential.is_valid(Utc::now()) {
        return Ok(credential);
    }
    if !credential.can_refresh() {
        return Err(MailError::Auth("stored credential expired and cannot be refreshed".to_string()).into());
    }

    credential.refresh(http).await?;
    if let Err(e) = credential.save(&path) {
        warn!("could not persist refreshed credential: {e:#}");
    }
    Ok(credential)
}
