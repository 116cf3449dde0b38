//! Report artifact directory access.

use crate::error::{Result, VitrineError};
use crate::store::atomic_write_text;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<title\b[^>]*>)(.*?)(</title>)").unwrap());

static H1_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<h1\b[^>]*>)(.*?)(</h1>)").unwrap());

static H2_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<h2\b[^>]*>)(.*?)(</h2>)").unwrap());

/// List report artifact file names in a flat directory, sorted.
///
/// Only `.html` files count; dotfiles and subdirectories are ignored. A
/// missing directory is a configuration error so a mistyped path can never
/// reconcile the catalog against an empty ground truth.
pub fn list_artifacts(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(VitrineError::Config {
            message: format!("Artifact directory not found: {}", dir.display()),
        });
    }

    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
        .filter(|name| !name.starts_with('.'))
        .filter(|name| {
            Path::new(name)
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("html"))
                .unwrap_or(false)
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Propagate a curated title into the backing artifact.
///
/// Rewrites the `<title>` element and the first `<h1>` (or `<h2>` when the
/// artifact has no `<h1>`). The artifact must exist; curation renames are
/// rejected otherwise so the page and its card cannot drift apart silently.
pub fn update_artifact_title(dir: &Path, identifier: &str, new_title: &str) -> Result<()> {
    let path = dir.join(identifier);
    if !path.is_file() {
        return Err(VitrineError::ArtifactNotFound {
            identifier: identifier.to_string(),
        });
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| VitrineError::io_with_path(e, path.clone()))?;

    let escaped = crate::document::escape_text(new_title);
    let mut updated = TITLE_TAG
        .replace(&content, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], escaped, &caps[3])
        })
        .to_string();

    let heading = if H1_TAG.is_match(&updated) { &H1_TAG } else { &H2_TAG };
    updated = heading
        .replace(&updated, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], escaped, &caps[3])
        })
        .to_string();

    atomic_write_text(&path, &updated)
}
