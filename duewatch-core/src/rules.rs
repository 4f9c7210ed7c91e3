//! Subject-line classification and spend exclusion rules.
//!
//! Both are plain ordered data so new issuers or keywords come from config
//! rather than from code.

use serde::{Deserialize, Serialize};

use crate::bill::Issuer;

/// Exact, case-sensitive substring of a statement subject mapped to an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRule {
    pub pattern: String,
    pub issuer: Issuer,
}

impl IssuerRule {
    pub fn new(pattern: impl Into<String>, issuer: Issuer) -> Self {
        Self {
            pattern: pattern.into(),
            issuer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuerRules(Vec<IssuerRule>);

impl IssuerRules {
    pub fn new(rules: Vec<IssuerRule>) -> Self {
        Self(rules)
    }

    /// First rule whose pattern occurs in `subject` wins.
    pub fn classify(&self, subject: &str) -> Option<Issuer> {
        self.0
            .iter()
            .find(|rule| !rule.pattern.is_empty() && subject.contains(&rule.pattern))
            .map(|rule| rule.issuer)
    }

    pub fn rules(&self) -> &[IssuerRule] {
        &self.0
    }
}

impl Default for IssuerRules {
    fn default() -> Self {
        Self(vec![
            IssuerRule::new(
                "Diners Club International Credit Card Statement",
                Issuer::DinersClub,
            ),
            IssuerRule::new("HDFC BANK UPI RuPay Credit Card Statement", Issuer::RupayCard),
            IssuerRule::new("HDFC Bank Pixel Credit Card Statement", Issuer::PixelCard),
        ])
    }
}

/// Keywords marking a debit alert as a card payment rather than spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionKeywords(Vec<String>);

impl ExclusionKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keywords.into_iter().map(Into::into).collect())
    }

    /// Case-folded substring match against the whole source text.
    pub fn excludes(&self, text: &str) -> bool {
        let folded = text.to_lowercase();
        self.0
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| folded.contains(&k.to_lowercase()))
    }
}

impl Default for ExclusionKeywords {
    fn default() -> Self {
        Self::new([
            "credit card",
            "card payment",
            "billdesk",
            "visa",
            "rupay",
            "ending",
            "your card",
            "billpay",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_subjects() {
        let rules = IssuerRules::default();
        assert_eq!(
            rules.classify("Your HDFC Bank Pixel Credit Card Statement for June"),
            Some(Issuer::PixelCard)
        );
        assert_eq!(
            rules.classify("Diners Club International Credit Card Statement - Jun 2025"),
            Some(Issuer::DinersClub)
        );
        assert_eq!(rules.classify("Axis Bank Credit Card Statement"), None);
    }

    #[test]
    fn test_classify_is_case_sensitive_and_ordered() {
        let rules = IssuerRules::new(vec![
            IssuerRule::new("Statement", Issuer::RupayCard),
            IssuerRule::new("Pixel", Issuer::PixelCard),
        ]);
        assert_eq!(rules.classify("Pixel Statement"), Some(Issuer::RupayCard));
        assert_eq!(rules.classify("pixel statement"), None);
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let kw = ExclusionKeywords::default();
        assert!(kw.excludes("Payment towards your CREDIT CARD was made"));
        assert!(kw.excludes("paid to BillDesk"));
        assert!(!kw.excludes("Rs.250.00 debited to VPA swiggy@icici on 05-06-25"));
    }

    #[test]
    fn test_rules_from_toml_shaped_json() {
        let rules: IssuerRules = serde_json::from_str(
            r#"[{"pattern":"Pixel","issuer":"pixel-card"}]"#,
        )
        .unwrap();
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.classify("HDFC Pixel"), Some(Issuer::PixelCard));
    }
}
