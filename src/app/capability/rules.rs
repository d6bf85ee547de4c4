//! Header derivation rules
//!
//! Competitor columns are named like `"Acme Free"`, `"Acme Pro"` or
//! `"Widgets (Pro Only)"`. The rules below turn such a header into a product
//! name and a tier. They are plain data so a different header vocabulary can
//! be configured without touching the reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability tier of a comparison column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Free,
    Pro,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Free => write!(f, "free"),
            Variant::Pro => write!(f, "pro"),
        }
    }
}

/// How a rule recognises a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Header ends with the pattern
    Suffix,
    /// Header contains the pattern anywhere
    Contains,
}

/// One `(matcher, variant, name transform)` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    #[serde(rename = "match")]
    pub kind: MatchKind,
    pub pattern: String,
    pub variant: Variant,
    /// Text removed from the header to obtain the product name
    pub strip: String,
}

impl HeaderRule {
    pub fn suffix(pattern: &str, variant: Variant) -> Self {
        Self {
            kind: MatchKind::Suffix,
            pattern: pattern.to_string(),
            variant,
            strip: pattern.to_string(),
        }
    }

    pub fn contains(pattern: &str, variant: Variant, strip: &str) -> Self {
        Self {
            kind: MatchKind::Contains,
            pattern: pattern.to_string(),
            variant,
            strip: strip.to_string(),
        }
    }

    fn matches(&self, header: &str) -> bool {
        match self.kind {
            MatchKind::Suffix => header.ends_with(self.pattern.as_str()),
            MatchKind::Contains => header.contains(self.pattern.as_str()),
        }
    }

    fn product_name(&self, header: &str) -> String {
        match self.kind {
            MatchKind::Suffix => header
                .strip_suffix(self.strip.as_str())
                .unwrap_or(header)
                .to_string(),
            // The marker may sit anywhere, so only its first occurrence goes
            MatchKind::Contains => header.replacen(self.strip.as_str(), "", 1),
        }
    }
}

/// A header tagged with its product and tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityColumn {
    pub index: usize,
    pub header: String,
    pub product: String,
    pub variant: Variant,
}

/// The vocabulary of the bundled comparison table
pub fn default_rules() -> Vec<HeaderRule> {
    vec![
        HeaderRule::suffix(" Free", Variant::Free),
        HeaderRule::suffix(" Pro", Variant::Pro),
        HeaderRule::contains("(Pro Only)", Variant::Pro, " (Pro Only)"),
    ]
}

/// Derive product and tier for a header; first matching rule wins, unmatched
/// headers are taken verbatim as pro-tier
pub fn derive_column(index: usize, header: &str, rules: &[HeaderRule]) -> CapabilityColumn {
    let (product, variant) = rules
        .iter()
        .find(|rule| rule.matches(header))
        .map(|rule| (rule.product_name(header), rule.variant))
        .unwrap_or_else(|| (header.to_string(), Variant::Pro));

    CapabilityColumn {
        index,
        header: header.to_string(),
        product,
        variant,
    }
}
