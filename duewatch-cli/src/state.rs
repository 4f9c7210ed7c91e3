use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$DUEWATCH_HOME`, or `~/.duewatch`.
pub fn duewatch_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("DUEWATCH_HOME")
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".duewatch"))
}

pub fn ensure_duewatch_home() -> Result<PathBuf> {
    let dir = duewatch_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_duewatch_home()?.join("config.toml"))
}

pub fn oauth_client_path() -> Result<PathBuf> {
    Ok(ensure_duewatch_home()?.join("google_oauth.json"))
}

pub fn credential_path() -> Result<PathBuf> {
    Ok(ensure_duewatch_home()?.join("gmail_token.json"))
}
