//! Showcase document rendering.

use crate::document::entities::{escape_text, fully_unescape};
use crate::document::{
    find_region, ALL_CATEGORY_KEY, ALL_CATEGORY_LABEL, CATEGORY_BAR_CLASS, REPORT_CARDS_CLASS,
};
use crate::error::Result;
use crate::record::{category_label, ReportRecord};
use crate::state::CatalogState;

/// Render catalog state into a document shell.
///
/// Both curated regions of `shell` are replaced wholesale: every pill and
/// every card is regenerated from `state`, so nothing in them can go stale.
/// The rest of the shell is preserved unchanged. `link_prefix` is the
/// directory segment of each card's href.
pub fn render(state: &CatalogState, shell: &str, link_prefix: &str) -> Result<String> {
    let with_pills = replace_region(shell, CATEGORY_BAR_CLASS, &render_pills(state))?;
    replace_region(&with_pills, REPORT_CARDS_CLASS, &render_cards(state, link_prefix))
}

fn replace_region(text: &str, class_marker: &str, new_inner: &str) -> Result<String> {
    let region = find_region(text, class_marker)?;
    let mut out = String::with_capacity(text.len() + new_inner.len());
    out.push_str(&text[..region.inner_start]);
    out.push_str(new_inner);
    out.push_str(&text[region.inner_end..]);
    Ok(out)
}

fn render_pills(state: &CatalogState) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "      <button class=\"category-pill active\" data-category=\"{}\">{}</button>\n",
        ALL_CATEGORY_KEY, ALL_CATEGORY_LABEL
    ));
    for key in state.categories() {
        out.push_str(&format!(
            "      <button class=\"category-pill\" data-category=\"{}\">{}</button>\n",
            key,
            category_label(key)
        ));
    }
    out.push_str("    ");
    out
}

fn render_cards(state: &CatalogState, link_prefix: &str) -> String {
    let mut out = String::new();
    out.push('\n');
    for record in state.all() {
        out.push_str(&render_card(record, link_prefix));
    }
    out.push_str("    ");
    out
}

fn render_card(record: &ReportRecord, link_prefix: &str) -> String {
    // data-disabled is always written, even when false: the client-side
    // filter script keys off the attribute value, not its presence.
    let hidden_style = if record.enabled {
        ""
    } else {
        " style=\"display: none;\""
    };
    format!(
        concat!(
            "      <div class=\"report-card\" data-categories=\"{categories}\"",
            " data-disabled=\"{disabled}\"{hidden}>\n",
            "        <div class=\"report-title\">{title}</div>\n",
            "        <div class=\"report-description\">{snippet}</div>\n",
            "        <a class=\"view-link\" href=\"{prefix}/{identifier}\" target=\"_blank\">",
            "<i class=\"fas fa-external-link-alt mr-1\"></i> View Full Report</a>\n",
            "      </div>\n",
        ),
        categories = record.categories.join(" "),
        disabled = !record.enabled,
        hidden = hidden_style,
        title = field_text(&record.title),
        snippet = field_text(&record.snippet),
        prefix = link_prefix,
        identifier = record.identifier,
    )
}

/// Escaped form of a stored text field.
///
/// Unescaping to a fixpoint first means a field that somehow arrived
/// already-escaped (or double-escaped) still renders with exactly one
/// level of escaping.
fn field_text(stored: &str) -> String {
    escape_text(&fully_unescape(stored))
}
