use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use duewatch_core::{DateWindow, ExclusionKeywords, IssuerRules, query};
use duewatch_ingest::{BillPlan, MessageBodyDecoder, PartScan, SpendPlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::state::config_path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gmail: GmailSection,
    pub bills: BillsSection,
    pub spend: SpendSection,
    pub decode: DecodeSection,
    pub dashboard: DashboardSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailSection {
    pub api_base: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillsSection {
    /// Subject phrase every statement mail carries.
    pub subject: String,
    pub newer_than_days: u32,
    pub max_results: usize,
    /// Ordered; first matching pattern names the issuer.
    pub issuers: IssuerRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendSection {
    pub subject: String,
    pub max_results: usize,
    pub exclude_keywords: ExclusionKeywords,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeSection {
    /// Look inside nested multipart containers, not only direct children.
    pub recursive_parts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    /// IANA timezone used to decide what "today" is.
    pub timezone: String,
}

impl Default for GmailSection {
    fn default() -> Self {
        Self {
            api_base: "https://gmail.googleapis.com/gmail/v1".to_string(),
            user_id: "me".to_string(),
        }
    }
}

impl Default for BillsSection {
    fn default() -> Self {
        Self {
            subject: "Credit Card Statement".to_string(),
            newer_than_days: 60,
            max_results: 20,
            issuers: IssuerRules::default(),
        }
    }
}

impl Default for SpendSection {
    fn default() -> Self {
        Self {
            subject: "You have done a UPI txn".to_string(),
            max_results: 500,
            exclude_keywords: ExclusionKeywords::default(),
        }
    }
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.dashboard
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid dashboard.timezone '{}': {e}", self.dashboard.timezone))
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }

    pub fn decoder(&self) -> MessageBodyDecoder {
        let scan = if self.decode.recursive_parts {
            PartScan::Recursive
        } else {
            PartScan::DirectChildren
        };
        MessageBodyDecoder::new(scan)
    }

    pub fn bill_plan(&self) -> BillPlan {
        BillPlan {
            query: query::statement_query(&self.bills.subject, self.bills.newer_than_days),
            max_results: self.bills.max_results,
            rules: self.bills.issuers.clone(),
        }
    }

    pub fn spend_plan(&self, window: DateWindow) -> SpendPlan {
        SpendPlan {
            query: query::spend_query(&self.spend.subject, &window),
            max_results: self.spend.max_results,
            exclusions: self.spend.exclude_keywords.clone(),
            window: Some(window),
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use duewatch_core::Issuer;

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[bills]
newer_than_days = 30

[[bills.issuers]]
pattern = "Pixel"
issuer = "pixel-card"

[decode]
recursive_parts = true
"#,
        )
        .unwrap();

        assert_eq!(cfg.bills.newer_than_days, 30);
        assert_eq!(cfg.bills.max_results, 20);
        assert_eq!(cfg.bills.issuers.classify("HDFC Pixel stmt"), Some(Issuer::PixelCard));
        assert_eq!(cfg.spend.subject, "You have done a UPI txn");
        assert!(cfg.decode.recursive_parts);
        assert_eq!(cfg.dashboard.timezone, "Asia/Kolkata");
    }

    #[test]
    fn test_bill_plan_query() {
        let plan = Config::default().bill_plan();
        assert_eq!(plan.query, "subject:(\"Credit Card Statement\") newer_than:60d");
        assert_eq!(plan.max_results, 20);
    }

    #[test]
    fn test_bad_timezone() {
        let mut cfg = Config::default();
        cfg.dashboard.timezone = "Mars/Olympus".to_string();
        assert!(cfg.timezone().is_err());
        cfg.dashboard.timezone = "Asia/Kolkata".to_string();
        assert!(cfg.timezone().is_ok());
    }
}
