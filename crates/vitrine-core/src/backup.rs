//! Point-in-time snapshots of the catalog.
//!
//! Every mutating run writes a snapshot of the pre-state before touching
//! the document, so the immediately prior catalog is always recoverable.
//! Snapshots are append-only: names carry a timestamp qualifier and a
//! numeric disambiguator, and nothing here ever overwrites or deletes one.

use crate::config::SnapshotConfig;
use crate::error::{Result, VitrineError};
use crate::record::ReportRecord;
use crate::state::CatalogState;
use crate::store::{atomic_write_json, atomic_write_text, read_text};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The two snapshot flavors written per reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Verbatim copy of the showcase document.
    Document,
    /// Structured dump of records, order, and categories.
    Structured,
}

/// One retained snapshot on disk.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub kind: SnapshotKind,
}

/// Structured snapshot payload.
///
/// All three sections are required; a dump missing any of them is rejected
/// as an invalid backup before anything is restored from it.
#[derive(Debug, Serialize, Deserialize)]
pub struct StructuredSnapshot {
    pub reports: Vec<ReportRecord>,
    pub order: Vec<String>,
    pub categories: Vec<String>,
}

impl StructuredSnapshot {
    pub fn from_state(state: &CatalogState) -> Self {
        Self {
            reports: state.all().to_vec(),
            order: state.order(),
            categories: state.categories().to_vec(),
        }
    }

    /// Rebuild catalog state, honoring the dumped order and appending any
    /// record the order list does not mention.
    pub fn into_state(self) -> CatalogState {
        let mut by_id: Vec<Option<ReportRecord>> = self.reports.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(by_id.len());
        for identifier in &self.order {
            if let Some(slot) = by_id
                .iter_mut()
                .find(|r| r.as_ref().map(|r| &r.identifier) == Some(identifier))
            {
                ordered.extend(slot.take());
            }
        }
        ordered.extend(by_id.into_iter().flatten());
        CatalogState::from_parts(ordered, self.categories)
    }
}

/// Writes and reads timestamped catalog snapshots.
pub struct BackupManager {
    backups_dir: PathBuf,
    document_stem: String,
}

impl BackupManager {
    pub fn new(backups_dir: impl Into<PathBuf>, document_stem: impl Into<String>) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            document_stem: document_stem.into(),
        }
    }

    /// Write a verbatim document snapshot. Returns its path.
    pub fn snapshot_document(&self, text: &str) -> Result<PathBuf> {
        let path = self.unique_path(SnapshotConfig::DOCUMENT_SUFFIX)?;
        atomic_write_text(&path, text)?;
        info!("Document snapshot written to {}", path.display());
        Ok(path)
    }

    /// Write a structured data snapshot of `state`. Returns its path.
    pub fn snapshot_structured(&self, state: &CatalogState) -> Result<PathBuf> {
        let path = self.unique_path(SnapshotConfig::DATA_SUFFIX)?;
        atomic_write_json(&path, &StructuredSnapshot::from_state(state))?;
        info!("Structured snapshot written to {}", path.display());
        Ok(path)
    }

    /// Retained snapshots, most recent first.
    ///
    /// The timestamp qualifier sorts lexicographically, so name order is
    /// recency order.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>> {
        if !self.backups_dir.is_dir() {
            return Ok(Vec::new());
        }
        let document_prefix = format!("{}_", self.document_stem);
        let mut entries: Vec<SnapshotEntry> = std::fs::read_dir(&self.backups_dir)
            .map_err(|e| VitrineError::io_with_path(e, self.backups_dir.clone()))?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                if !name.starts_with(&document_prefix) {
                    return None;
                }
                let kind = if name.ends_with(SnapshotConfig::DOCUMENT_SUFFIX) {
                    SnapshotKind::Document
                } else if name.ends_with(SnapshotConfig::DATA_SUFFIX) {
                    SnapshotKind::Structured
                } else {
                    return None;
                };
                Some(SnapshotEntry {
                    path: e.path(),
                    kind,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.path.file_name().cmp(&a.path.file_name()));
        Ok(entries)
    }

    /// Load and validate a structured snapshot.
    pub fn load_structured(&self, path: &Path) -> Result<CatalogState> {
        let Some(text) = read_text(path)? else {
            return Err(VitrineError::InvalidBackup {
                message: format!("Snapshot not found: {}", path.display()),
            });
        };

        // Check the sections by name first so a truncated or foreign JSON
        // file reports what is missing rather than a type mismatch.
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| VitrineError::InvalidBackup {
                message: format!("Snapshot is not valid JSON: {}", e),
            })?;
        for section in ["reports", "order", "categories"] {
            if value.get(section).is_none() {
                return Err(VitrineError::InvalidBackup {
                    message: format!("Snapshot missing required section: {}", section),
                });
            }
        }

        let snapshot: StructuredSnapshot =
            serde_json::from_value(value).map_err(|e| VitrineError::InvalidBackup {
                message: format!("Snapshot structure invalid: {}", e),
            })?;
        Ok(snapshot.into_state())
    }

    /// Next free snapshot path for the given suffix.
    ///
    /// Same-second collisions get a numeric qualifier; existing snapshots
    /// are never reused.
    fn unique_path(&self, suffix: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.backups_dir)
            .map_err(|e| VitrineError::io_with_path(e, self.backups_dir.clone()))?;

        let timestamp = Local::now().format(SnapshotConfig::TIMESTAMP_FORMAT);
        let base = format!("{}_{}", self.document_stem, timestamp);
        let mut candidate = self.backups_dir.join(format!("{}_{}", base, suffix));
        let mut qualifier = 1u32;
        while candidate.exists() {
            qualifier += 1;
            candidate = self
                .backups_dir
                .join(format!("{}_{}_{}", base, qualifier, suffix));
        }
        debug!("Allocated snapshot name {}", candidate.display());
        Ok(candidate)
    }
}
