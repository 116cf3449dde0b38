//! Showcase document model.
//!
//! The showcase HTML file is simultaneously the metadata store and the
//! rendered listing page. This module is the only place that touches its
//! markup: [`parse`] recovers a [`CatalogState`] from the two curated
//! regions, and [`render`] rewrites those regions wholesale from a state.
//! Everything between the regions (styles, scripts, headings) is treated as
//! an opaque shell and preserved byte-for-byte.

mod entities;
mod parse;
mod render;
mod template;

pub use entities::{escape_text, fully_unescape, repair_double_escaping, unescape_text};
pub use parse::parse;
pub use render::render;
pub use template::default_document;

use crate::error::{Result, VitrineError};

/// Class marker of the category pill container.
pub const CATEGORY_BAR_CLASS: &str = "category-bar";
/// Class marker of the report card container.
pub const REPORT_CARDS_CLASS: &str = "report-cards";
/// Pseudo-category key of the fixed first pill.
pub const ALL_CATEGORY_KEY: &str = "all";
/// Label of the fixed first pill.
pub const ALL_CATEGORY_LABEL: &str = "All Reports";

/// Byte range of a located container's inner content.
#[derive(Debug)]
pub(crate) struct Region {
    pub inner_start: usize,
    pub inner_end: usize,
}

/// Locate a `<div>` container by class marker and return its inner range.
///
/// Card containers nest further `<div>`s, so the close tag is found by
/// balanced counting rather than by the nearest `</div>`.
pub(crate) fn find_region(text: &str, class_marker: &str) -> Result<Region> {
    let open = regex::Regex::new(&format!(
        r#"<div\b[^>]*class="[^"]*\b{}\b[^"]*"[^>]*>"#,
        regex::escape(class_marker)
    ))
    .expect("container regex must compile");

    let open_match = open.find(text).ok_or_else(|| VitrineError::MissingRegion {
        region: class_marker.to_string(),
    })?;

    let inner_start = open_match.end();
    let mut depth: usize = 1;
    let mut cursor = inner_start;
    let bytes = text.as_bytes();

    while cursor < text.len() {
        let Some(next_tag) = text[cursor..].find('<').map(|i| cursor + i) else {
            break;
        };
        let rest = &text[next_tag..];
        if rest.starts_with("</div>") {
            depth -= 1;
            if depth == 0 {
                return Ok(Region {
                    inner_start,
                    inner_end: next_tag,
                });
            }
            cursor = next_tag + "</div>".len();
        } else if rest.starts_with("<div")
            && matches!(bytes.get(next_tag + 4), Some(b' ') | Some(b'>') | Some(b'\t') | Some(b'\n') | Some(b'\r'))
        {
            depth += 1;
            cursor = next_tag + 4;
        } else {
            cursor = next_tag + 1;
        }
    }

    Err(VitrineError::Parse {
        message: format!("Unterminated {} container", class_marker),
    })
}
