//! Catalog configuration.
//!
//! All paths are explicit values handed to components at construction time;
//! nothing reads an implicit working directory.

use std::path::{Path, PathBuf};

/// Default file name of the showcase document under a site root.
pub const DEFAULT_DOCUMENT_NAME: &str = "showcase.html";
/// Default directory name holding the report artifacts under a site root.
pub const DEFAULT_ARTIFACTS_DIR: &str = "reports";

/// Locations of the showcase document, the artifact directory, and snapshots.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Path of the showcase HTML document (data store and rendered page).
    pub document_path: PathBuf,
    /// Flat directory containing the report artifacts.
    pub artifacts_dir: PathBuf,
    /// Directory that receives timestamped snapshots.
    pub backups_dir: PathBuf,
}

impl CatalogConfig {
    /// Explicit paths for every location.
    pub fn new(
        document_path: impl Into<PathBuf>,
        artifacts_dir: impl Into<PathBuf>,
        backups_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            document_path: document_path.into(),
            artifacts_dir: artifacts_dir.into(),
            backups_dir: backups_dir.into(),
        }
    }

    /// Conventional layout under a single site root: `showcase.html`,
    /// `reports/`, snapshots next to the document.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            document_path: root.join(DEFAULT_DOCUMENT_NAME),
            artifacts_dir: root.join(DEFAULT_ARTIFACTS_DIR),
            backups_dir: root.to_path_buf(),
        }
    }

    /// Link prefix for card hrefs, derived from the artifact directory name.
    pub fn link_prefix(&self) -> String {
        self.artifacts_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string())
    }

    /// Document file stem used to qualify snapshot names.
    pub fn document_stem(&self) -> String {
        self.document_path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "showcase".to_string())
    }
}

/// Snapshot naming parameters.
pub struct SnapshotConfig;

impl SnapshotConfig {
    /// Timestamp qualifier embedded in snapshot names (local time).
    pub const TIMESTAMP_FORMAT: &'static str = "%Y%m%d_%H%M%S";
    /// Suffix of verbatim document snapshots.
    pub const DOCUMENT_SUFFIX: &'static str = "backup.html";
    /// Suffix of structured data snapshots.
    pub const DATA_SUFFIX: &'static str = "data.json";
}

/// Tuning knobs for the default metadata extraction heuristics.
pub struct ExtractionConfig;

impl ExtractionConfig {
    /// Word budget for the snippet before sentence-completion kicks in.
    pub const SNIPPET_WORD_LIMIT: usize = 50;
    /// Category keyword matching only scans this much of the artifact body.
    pub const CONTENT_SCAN_LIMIT: usize = 10_000;
    /// Snippet used when no paragraph can be extracted.
    pub const DEFAULT_SNIPPET: &'static str = "Instructor report for this assignment.";
}
