//! HTML entity escaping for card text fields.
//!
//! Stored titles and snippets are plain text; escaping is applied exactly
//! once at render time, after unescaping to a fixpoint. That pairing is what
//! keeps `&amp;amp;`-style double escaping from ever accumulating across
//! repeated parse/render cycles.

use regex::Regex;
use std::sync::LazyLock;

/// Any named or numeric character reference.
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap());

/// Unescape passes are bounded; real documents never nest this deep.
const MAX_UNESCAPE_PASSES: usize = 8;

/// Escape text for embedding in an HTML text node (minimal formatter:
/// `&`, `<`, `>` only).
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode one level of character references.
pub fn unescape_text(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            match body {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => "\u{a0}".to_string(),
                _ => decode_numeric(body).unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .to_string()
}

/// Decode character references until the text stops changing.
///
/// A double-escaped `&amp;amp;` collapses to `&` here, which is what lets
/// a later single [`escape_text`] produce the correctly escaped form.
pub fn fully_unescape(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_UNESCAPE_PASSES {
        let next = unescape_text(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Normalize a possibly multiply-escaped field back to single escaping.
pub fn repair_double_escaping(text: &str) -> String {
    escape_text(&fully_unescape(text))
}

fn decode_numeric(body: &str) -> Option<String> {
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).map(|c| c.to_string())
}
