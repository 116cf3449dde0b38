//! Showcase document parsing.

use crate::document::entities::fully_unescape;
use crate::document::{find_region, ALL_CATEGORY_KEY, CATEGORY_BAR_CLASS, REPORT_CARDS_CLASS};
use crate::error::Result;
use crate::record::{normalize_category_key, ReportRecord};
use crate::state::CatalogState;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static PILL_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<button\b[^>]*class="[^"]*category-pill[^"]*"[^>]*>"#).unwrap()
});

static CARD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div\b[^>]*class="[^"]*report-card[^"]*"[^>]*>"#).unwrap());

static TITLE_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b[^>]*class="[^"]*report-title[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static SNIPPET_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b[^>]*class="[^"]*report-description[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static VIEW_LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\b[^>]*class="[^"]*view-link[^"]*"[^>]*>"#).unwrap());

static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).unwrap());

static DATA_CATEGORY_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-category="([^"]*)""#).unwrap());

static DATA_CATEGORIES_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-categories="([^"]*)""#).unwrap());

static DATA_DISABLED_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-disabled="([^"]*)""#).unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// Parse a showcase document into catalog state.
///
/// Both curated regions must be present (`MissingRegion` otherwise). Within
/// the card region, a malformed card is skipped with a warning; it never
/// fails the whole parse.
pub fn parse(text: &str) -> Result<CatalogState> {
    let categories = parse_categories(text)?;
    let records = parse_cards(text)?;
    Ok(CatalogState::from_parts(records, categories))
}

fn parse_categories(text: &str) -> Result<Vec<String>> {
    let region = find_region(text, CATEGORY_BAR_CLASS)?;
    let inner = &text[region.inner_start..region.inner_end];

    let mut keys = Vec::new();
    for pill in PILL_TAG.find_iter(inner) {
        let Some(caps) = DATA_CATEGORY_ATTR.captures(pill.as_str()) else {
            warn!("Category pill without data-category attribute skipped");
            continue;
        };
        let key = normalize_category_key(&caps[1]);
        if key == ALL_CATEGORY_KEY || key.is_empty() {
            continue;
        }
        keys.push(key);
    }
    Ok(keys)
}

fn parse_cards(text: &str) -> Result<Vec<ReportRecord>> {
    let region = find_region(text, REPORT_CARDS_CLASS)?;
    let inner = &text[region.inner_start..region.inner_end];

    // Each card slice runs from its open tag to the next card's open tag
    // (or the end of the region); cards are never nested in one another.
    let opens: Vec<_> = CARD_OPEN.find_iter(inner).collect();
    let mut records = Vec::new();

    for (index, open) in opens.iter().enumerate() {
        let slice_end = opens.get(index + 1).map(|m| m.start()).unwrap_or(inner.len());
        let slice = &inner[open.start()..slice_end];

        match parse_card(open.as_str(), slice) {
            Some(record) => records.push(record),
            None => warn!("Malformed report card at index {} skipped", index),
        }
    }
    Ok(records)
}

fn parse_card(open_tag: &str, slice: &str) -> Option<ReportRecord> {
    let link_tag = VIEW_LINK_TAG.find(slice)?;
    let href = HREF_ATTR.captures(link_tag.as_str())?.get(1)?.as_str();
    let identifier = href.rsplit('/').next()?.to_string();
    if identifier.is_empty() {
        return None;
    }

    let title = TITLE_DIV
        .captures(slice)
        .map(|caps| text_content(&caps[1]))
        .unwrap_or_default();
    let snippet = SNIPPET_DIV
        .captures(slice)
        .map(|caps| text_content(&caps[1]))
        .unwrap_or_default();

    let categories = DATA_CATEGORIES_ATTR
        .captures(open_tag)
        .map(|caps| {
            caps[1]
                .split_whitespace()
                .map(normalize_category_key)
                .filter(|key| !key.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let enabled = DATA_DISABLED_ATTR
        .captures(open_tag)
        .map(|caps| &caps[1] != "true")
        .unwrap_or(true);

    let mut record = ReportRecord::new(identifier, title, snippet, categories);
    record.enabled = enabled;
    Some(record)
}

/// Plain text of a captured element body: tags stripped, entities decoded
/// to a fixpoint, whitespace trimmed.
fn text_content(body: &str) -> String {
    let stripped = ANY_TAG.replace_all(body, "");
    fully_unescape(stripped.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> String {
        r#"<html><body>
  <div class="category-bar">
    <button class="category-pill active" data-category="all">All Reports</button>
    <button class="category-pill" data-category="ethics">Ethics</button>
    <button class="category-pill" data-category="health">Health</button>
  </div>
  <div class="report-cards">
    <div class="report-card" data-categories="ethics" data-disabled="false">
      <div class="report-title">Life &amp; Death</div>
      <div class="report-description">A study of care.</div>
      <a class="view-link" href="reports/r1.html" target="_blank"><i class="fas fa-external-link-alt mr-1"></i> View Full Report</a>
    </div>
    <div class="report-card" data-categories="health ethics" data-disabled="true" style="display: none;">
      <div class="report-title">Second</div>
      <div class="report-description">Another.</div>
      <a class="view-link" href="reports/r2.html" target="_blank"><i class="fas fa-external-link-alt mr-1"></i> View Full Report</a>
    </div>
  </div>
</body></html>"#
            .to_string()
    }

    #[test]
    fn test_parse_recovers_records_and_registry() {
        let state = parse(&sample_document()).unwrap();
        assert_eq!(state.categories(), &["ethics", "health"]);
        assert_eq!(state.order(), vec!["r1.html", "r2.html"]);

        let first = state.find("r1.html").unwrap();
        assert_eq!(first.title, "Life & Death");
        assert_eq!(first.snippet, "A study of care.");
        assert_eq!(first.categories, vec!["ethics"]);
        assert!(first.enabled);
        assert_eq!(first.position, 1);

        let second = state.find("r2.html").unwrap();
        assert!(!second.enabled);
        assert_eq!(second.categories, vec!["health", "ethics"]);
        assert_eq!(second.position, 2);
    }

    #[test]
    fn test_parse_skips_card_without_link() {
        let doc = r#"<div class="category-bar"><button class="category-pill" data-category="all">All Reports</button></div>
<div class="report-cards">
  <div class="report-card" data-categories="">
    <div class="report-title">No link here</div>
  </div>
  <div class="report-card" data-categories="">
    <div class="report-title">Good</div>
    <div class="report-description">d</div>
    <a class="view-link" href="reports/ok.html" target="_blank">View</a>
  </div>
</div>"#;
        let state = parse(doc).unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.find("ok.html").is_some());
    }

    #[test]
    fn test_parse_missing_card_region_is_fatal() {
        let doc = r#"<div class="category-bar"></div>"#;
        let err = parse(doc).unwrap_err();
        assert!(matches!(err, crate::error::VitrineError::MissingRegion { .. }));
    }

    #[test]
    fn test_parse_card_without_disabled_attr_defaults_enabled() {
        let doc = r#"<div class="category-bar"></div>
<div class="report-cards">
  <div class="report-card" data-categories="ethics">
    <div class="report-title">Old style card</div>
    <div class="report-description">d</div>
    <a class="view-link" href="reports/old.html">View</a>
  </div>
</div>"#;
        let state = parse(doc).unwrap();
        assert!(state.find("old.html").unwrap().enabled);
    }

    #[test]
    fn test_parse_unwraps_markup_in_text_fields() {
        let doc = r#"<div class="category-bar"></div>
<div class="report-cards">
  <div class="report-card">
    <div class="report-title"><span>Wrapped &amp;amp; doubled</span></div>
    <div class="report-description">d</div>
    <a class="view-link" href="reports/w.html">View</a>
  </div>
</div>"#;
        let state = parse(doc).unwrap();
        // tags stripped, double escaping collapsed to plain text
        assert_eq!(state.find("w.html").unwrap().title, "Wrapped & doubled");
    }
}
