//! Best-effort metadata extraction from report artifacts.
//!
//! Extraction is a collaborator of the reconciliation engine, not part of
//! it: every failure here degrades to a derived default and is logged,
//! never escalated. Keyword inference drifts as the corpus changes, so the
//! engine only ever sees the [`MetadataExtractor`] trait and the heuristics
//! stay swappable.

use crate::config::ExtractionConfig;
use crate::document::fully_unescape;
use crate::record::normalize_category_key;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static GENERATED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h1\b[^>]*class="[^"]*generated-title[^"]*"[^>]*>(.*?)</h1>"#).unwrap()
});

static ANY_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h1\b[^>]*>(.*?)</h1>").unwrap());

static CONTENT_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\b[^>]*(?:id="report-content"|class="[^"]*markdown-content[^"]*")[^>]*>"#)
        .unwrap()
});

static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p\b[^>]*>(.*?)</p>").unwrap());

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?[.!?])").unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// Trailing generated-id suffix on artifact file names (`_a1b2c3d4...`).
static HEX_ID_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[0-9a-f]{8,}.*$").unwrap());

/// Metadata derived from one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: String,
    pub snippet: String,
    pub categories: Vec<String>,
}

/// Strategy interface for deriving default metadata from an artifact.
pub trait MetadataExtractor {
    /// Derive title, snippet, and categories for `identifier`.
    ///
    /// Implementations must be total: whatever goes wrong with the artifact,
    /// they return usable defaults.
    fn extract(&self, artifact_path: &Path, identifier: &str) -> ExtractedMetadata;
}

/// Default keyword-driven extractor.
pub struct HeuristicExtractor {
    /// `(category key, keywords)` pairs checked against title and body.
    keywords: Vec<(String, Vec<String>)>,
    /// Categories every new record starts with.
    default_categories: Vec<String>,
}

impl HeuristicExtractor {
    pub fn new(
        keywords: Vec<(String, Vec<String>)>,
        default_categories: Vec<String>,
    ) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|(key, words)| (normalize_category_key(&key), words))
                .collect(),
            default_categories: default_categories
                .iter()
                .map(|c| normalize_category_key(c))
                .collect(),
        }
    }

    /// Built-in keyword table for the instructor-report corpus.
    pub fn builtin_keywords() -> Vec<(String, Vec<String>)> {
        let table: &[(&str, &[&str])] = &[
            (
                "healthcare",
                &["health", "hospital", "patient", "medical", "treatment", "therapy", "disease"],
            ),
            (
                "science",
                &["science", "scientific", "research", "biology", "physics", "chemistry", "genetic"],
            ),
            (
                "philosophy",
                &["philosophy", "ethics", "moral", "virtue", "principle", "duty", "utilitarian"],
            ),
            (
                "bioethics",
                &["bioethics", "euthanasia", "cloning", "genetic engineering", "reproductive"],
            ),
            (
                "environment",
                &["environment", "climate", "ecology", "conservation", "extinction", "sustainability"],
            ),
            (
                "social-issues",
                &["social", "society", "inequality", "justice", "discrimination", "policy", "poverty"],
            ),
        ];
        table
            .iter()
            .map(|(key, words)| {
                (
                    key.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect()
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new(Self::builtin_keywords(), vec!["ethics".to_string()])
    }
}

impl MetadataExtractor for HeuristicExtractor {
    fn extract(&self, artifact_path: &Path, identifier: &str) -> ExtractedMetadata {
        let content = match std::fs::read_to_string(artifact_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read artifact {}: {}", artifact_path.display(), e);
                return ExtractedMetadata {
                    title: fallback_title(identifier),
                    snippet: ExtractionConfig::DEFAULT_SNIPPET.to_string(),
                    categories: self.default_categories.clone(),
                };
            }
        };

        let title = extract_title(&content).unwrap_or_else(|| fallback_title(identifier));
        let snippet = extract_snippet(&content)
            .unwrap_or_else(|| ExtractionConfig::DEFAULT_SNIPPET.to_string());
        let categories = self.infer_categories(&title, &content);

        ExtractedMetadata {
            title,
            snippet,
            categories,
        }
    }
}

impl HeuristicExtractor {
    fn infer_categories(&self, title: &str, content: &str) -> Vec<String> {
        let title_lower = title.to_lowercase();
        let mut scan_end = content.len().min(ExtractionConfig::CONTENT_SCAN_LIMIT);
        while !content.is_char_boundary(scan_end) {
            scan_end -= 1;
        }
        let body_lower = content[..scan_end].to_lowercase();

        let mut categories = self.default_categories.clone();
        for (key, words) in &self.keywords {
            let hit = words
                .iter()
                .any(|w| title_lower.contains(w.as_str()) || body_lower.contains(w.as_str()));
            if hit && !categories.contains(key) {
                categories.push(key.clone());
            }
        }
        categories
    }
}

/// Title from the generated heading, falling back to any `<h1>`.
fn extract_title(content: &str) -> Option<String> {
    let caps = GENERATED_TITLE
        .captures(content)
        .or_else(|| ANY_H1.captures(content))?;
    let text = text_content(&caps[1]);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First paragraph of the designated content region, truncated to the word
/// budget plus the remainder of the sentence in progress, with an ellipsis.
fn extract_snippet(content: &str) -> Option<String> {
    let region_start = CONTENT_REGION.find(content)?.end();
    let caps = FIRST_PARAGRAPH.captures(&content[region_start..])?;
    let text = text_content(&caps[1]);
    if text.is_empty() {
        return None;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= ExtractionConfig::SNIPPET_WORD_LIMIT {
        return Some(words.join(" "));
    }

    let mut truncated = words[..ExtractionConfig::SNIPPET_WORD_LIMIT].join(" ");
    let remainder = words[ExtractionConfig::SNIPPET_WORD_LIMIT..].join(" ");
    if let Some(caps) = SENTENCE_END.captures(&remainder) {
        truncated.push(' ');
        truncated.push_str(&caps[1]);
    }
    truncated.push_str("...");
    Some(truncated)
}

/// Identifier-derived fallback title: extension and generated hex suffix
/// stripped, separators turned into spaces.
pub fn fallback_title(identifier: &str) -> String {
    let base = identifier.strip_suffix(".html").unwrap_or(identifier);
    let cleaned = HEX_ID_SUFFIX.replace(base, "");
    cleaned.replace(['-', '_'], " ").trim().to_string()
}

fn text_content(body: &str) -> String {
    let stripped = ANY_TAG.replace_all(body, "");
    fully_unescape(stripped.trim())
}
