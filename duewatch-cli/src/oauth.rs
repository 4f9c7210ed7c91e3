use anyhow::{Context, Result, bail};
use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::credential::{Credential, TokenResponse};
use crate::state::{credential_path, oauth_client_path};

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_REDIRECT_URI: &str = "http://localhost";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthClient {
    pub client_id: String,
    pub client_secret: String,
    /// Defaults to https://accounts.google.com/o/oauth2/auth
    pub auth_uri: Option<String>,
    /// Defaults to https://oauth2.googleapis.com/token
    pub token_uri: Option<String>,
    /// Defaults to ["http://localhost"]
    pub redirect_uris: Option<Vec<String>>,
}

impl GoogleOAuthClient {
    fn auth_uri(&self) -> &str {
        self.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .as_ref()
            .and_then(|uris| uris.first())
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }

    /// Consent URL for read-only Gmail access with an offline refresh token.
    pub fn authorization_url(&self) -> Result<Url> {
        Url::parse_with_params(
            self.auth_uri(),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", GMAIL_READONLY_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .with_context(|| format!("build authorization url from {}", self.auth_uri()))
    }

    pub async fn exchange_code(&self, http: &reqwest::Client, code: &str) -> Result<Credential> {
        let resp = http
            .post(self.token_uri())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri()),
            ])
            .send()
            .await
            .context("token exchange request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("token exchange error: {status} {txt}");
        }
        let body: TokenResponse = resp.json().await.context("parse token response")?;

        let mut credential = Credential {
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
            token_uri: self.token_uri().to_string(),
            client_id: self.client_id.clone(),
            client_secret: Some(self.client_secret.clone()),
            scopes: vec![GMAIL_READONLY_SCOPE.to_string()],
        };
        credential.apply(body, Utc::now());
        Ok(credential)
    }
}

pub fn save_oauth_client(client: &GoogleOAuthClient) -> Result<()> {
    let p = oauth_client_path()?;
    fs::write(&p, serde_json::to_string_pretty(client)?)
        .with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn load_oauth_client() -> Result<GoogleOAuthClient> {
    let p = oauth_client_path()?;
    if !p.exists() {
        bail!(
            "Missing Google OAuth client config at {}. Run: duewatch auth connect",
            p.display()
        );
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

/// Pull the authorization code out of whatever the user pasted: the full
/// redirect URL, a bare query string, or just the code.
pub fn code_from_pasted(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(input) {
        return url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty());
    }
    if input.contains("code=") {
        return input
            .trim_start_matches('?')
            .split('&')
            .find_map(|kv| kv.strip_prefix("code="))
            .filter(|v| !v.is_empty())
            .map(str::to_string);
    }
    Some(input.to_string())
}

/// One-time setup: store the Desktop-app OAuth client for Gmail.
pub fn connect_interactive() -> Result<()> {
    println!("Gmail connect\n");
    println!("You need to create OAuth credentials once:\n");
    println!("1) Go to: https://console.cloud.google.com/apis/credentials");
    println!("2) Enable the Gmail API for the project");
    println!("3) Create credentials -> OAuth client ID, application type: Desktop app");
    println!("4) Copy client_id + client_secret\n");

    let client_id = prompt("Paste client_id")?;
    let client_secret = prompt("Paste client_secret")?;

    if !client_id.contains('.') || client_secret.len() < 10 {
        bail!("client_id/client_secret didn't look valid");
    }

    save_oauth_client(&GoogleOAuthClient {
        client_id,
        client_secret,
        auth_uri: Some(DEFAULT_AUTH_URI.to_string()),
        token_uri: Some(DEFAULT_TOKEN_URI.to_string()),
        redirect_uris: Some(vec![DEFAULT_REDIRECT_URI.to_string()]),
    })?;

    println!("\nSaved. Next: duewatch auth login");
    Ok(())
}

/// Consent flow: print the URL, take the pasted redirect, store the token.
pub async fn login_interactive(http: &reqwest::Client) -> Result<()> {
    let client = load_oauth_client()?;
    let url = client.authorization_url()?;

    println!("Open this URL in a browser and approve read-only Gmail access:\n");
    println!("{url}\n");
    println!("After approving, the browser lands on a localhost page that may fail to load.");
    println!("Copy the full URL from the address bar.\n");

    let pasted = prompt("Paste redirect URL or code")?;
    let Some(code) = code_from_pasted(&pasted) else {
        bail!("no authorization code found in the pasted text");
    };

    let credential = client.exchange_code(http, &code).await?;
    let p = credential_path()?;
    credential.save(&p)?;
    println!("\nLogged in. Token stored at: {}", p.display());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::{self, Write};
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}
