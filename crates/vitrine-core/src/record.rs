//! Catalog record and category key handling.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Whitespace runs, collapsed during category normalization.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Consecutive hyphens left over after normalization.
static HYPHEN_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// One catalog entry per report artifact.
///
/// Titles and snippets are stored as plain text; entity escaping happens
/// only at the document boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Artifact file name; unique key, stable across runs.
    pub identifier: String,
    pub title: String,
    pub snippet: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 1-based dense display rank.
    #[serde(default)]
    pub position: usize,
}

fn default_enabled() -> bool {
    true
}

impl ReportRecord {
    /// A fresh enabled record; `position` is assigned by the catalog.
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            snippet: snippet.into(),
            categories: normalize_category_keys(&categories),
            enabled: true,
            position: 0,
        }
    }
}

/// Normalize a list of raw categories, dropping empties and duplicates
/// while keeping first-seen order.
pub fn normalize_category_keys(raw: &[String]) -> Vec<String> {
    let mut keys = Vec::with_capacity(raw.len());
    for key in raw.iter().map(|c| normalize_category_key(c)) {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Normalize a raw category into its registry key form.
///
/// Lowercase, trimmed, internal whitespace replaced by single hyphens,
/// hyphen runs collapsed.
///
/// # Examples
///
/// ```
/// use vitrine_core::record::normalize_category_key;
///
/// assert_eq!(normalize_category_key("Social Issues"), "social-issues");
/// assert_eq!(normalize_category_key("  Health  Care "), "health-care");
/// ```
pub fn normalize_category_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    HYPHEN_RUN
        .replace_all(&hyphenated, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive the display label for a category key: hyphens become spaces,
/// each word is title-cased.
///
/// # Examples
///
/// ```
/// use vitrine_core::record::category_label;
///
/// assert_eq!(category_label("social-issues"), "Social Issues");
/// assert_eq!(category_label("ethics"), "Ethics");
/// ```
pub fn category_label(key: &str) -> String {
    key.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
