//! High-level catalog API.
//!
//! `Vitrine` is the single entry point the CLI (or any host program) talks
//! to. Every mutating operation follows the same discipline: snapshot the
//! current document, apply the change in memory, rewrite the document
//! wholesale. The snapshot location is part of each operation's result so a
//! curator can always restore the immediately prior state.

use crate::artifacts::{list_artifacts, update_artifact_title};
use crate::backup::{BackupManager, SnapshotEntry, SnapshotKind};
use crate::config::CatalogConfig;
use crate::document;
use crate::error::{Result, VitrineError};
use crate::extract::{HeuristicExtractor, MetadataExtractor};
use crate::reconcile::{ReconcileOptions, ReconcileOutcome, Reconciler};
use crate::record::ReportRecord;
use crate::state::CatalogState;
use crate::store::DocumentStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of one curation change: the operation's value plus the snapshot
/// taken before anything was written.
#[derive(Debug)]
pub struct Change<T> {
    pub value: T,
    /// Pre-change document snapshot; absent when no document existed yet.
    pub snapshot: Option<PathBuf>,
}

/// Result of a restore.
#[derive(Debug)]
pub struct RestoreOutcome {
    /// Snapshot of the document as it was just before the restore.
    pub pre_restore_snapshot: Option<PathBuf>,
    /// The reconciliation pass that ran against the restored document.
    pub reconcile: ReconcileOutcome,
}

/// The catalog facade.
pub struct Vitrine {
    config: CatalogConfig,
    extractor: Box<dyn MetadataExtractor>,
}

impl Vitrine {
    /// Catalog over `config` with the default extraction heuristics.
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_extractor(config, Box::new(HeuristicExtractor::default()))
    }

    /// Catalog with a caller-supplied extraction strategy.
    pub fn with_extractor(config: CatalogConfig, extractor: Box<dyn MetadataExtractor>) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ========================================
    // Queries
    // ========================================

    /// All records in display order.
    pub fn records(&self) -> Result<Vec<ReportRecord>> {
        let (state, _) = self.store().load()?;
        Ok(state.all().to_vec())
    }

    /// Registry keys in insertion order.
    pub fn categories(&self) -> Result<Vec<String>> {
        let (state, _) = self.store().load()?;
        Ok(state.categories().to_vec())
    }

    /// Retained snapshots, most recent first.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>> {
        self.backups().list_snapshots()
    }

    // ========================================
    // Reconciliation
    // ========================================

    /// Reconcile the catalog against the artifact directory.
    pub fn sync(&self, refresh_existing: bool) -> Result<ReconcileOutcome> {
        Reconciler::new(&self.config, self.extractor.as_ref())
            .run(ReconcileOptions { refresh_existing })
    }

    /// Restore the catalog from a snapshot, then reconcile once to absorb
    /// artifacts added since the snapshot was taken.
    ///
    /// The current document (if any) is snapshotted first, so a bad restore
    /// is itself recoverable.
    pub fn restore(&self, snapshot_path: &Path) -> Result<RestoreOutcome> {
        let kind = snapshot_kind(snapshot_path)?;
        let store = self.store();
        let backups = self.backups();

        // For a structured restore, validate before any write.
        let restored_state = match kind {
            SnapshotKind::Structured => Some(backups.load_structured(snapshot_path)?),
            SnapshotKind::Document => None,
        };

        let pre_restore_snapshot = match store.load_text()? {
            Some(current) => Some(backups.snapshot_document(&current)?),
            None => None,
        };

        match restored_state {
            None => {
                let Some(text) = crate::store::read_text(snapshot_path)? else {
                    return Err(VitrineError::InvalidBackup {
                        message: format!("Snapshot not found: {}", snapshot_path.display()),
                    });
                };
                store.save_text(&text)?;
                info!("Restored document from {}", snapshot_path.display());
            }
            Some(state) => {
                // Rebuild through the normal render path, over the current
                // shell when one exists.
                let shell = store
                    .load_text()?
                    .unwrap_or_else(document::default_document);
                store.save(&state, &shell)?;
                info!("Restored data from {}", snapshot_path.display());
            }
        }

        let reconcile = self.sync(false)?;
        Ok(RestoreOutcome {
            pre_restore_snapshot,
            reconcile,
        })
    }

    /// Remove records whose artifacts are gone from disk. The only
    /// deletion path; reconciliation itself never removes anything.
    pub fn prune(&self) -> Result<Change<Vec<String>>> {
        let present = list_artifacts(&self.config.artifacts_dir)?;
        self.mutate(|state| {
            let stale: Vec<String> = state
                .order()
                .into_iter()
                .filter(|id| !present.contains(id))
                .collect();
            for identifier in &stale {
                state.remove_record(identifier);
            }
            Ok(stale)
        })
    }

    // ========================================
    // Curation operations
    // ========================================

    /// Add a category to the registry.
    pub fn add_category(&self, key: &str) -> Result<Change<String>> {
        self.mutate(|state| state.add_category(key))
    }

    /// Rename a category, cascading to every record.
    pub fn rename_category(&self, old: &str, new: &str) -> Result<Change<(String, String)>> {
        self.mutate(|state| state.rename_category(old, new))
    }

    /// Delete a category from the registry and every record's set.
    /// Returns how many records referenced it.
    pub fn delete_category(&self, key: &str) -> Result<Change<usize>> {
        self.mutate(|state| state.delete_category(key))
    }

    /// Replace a record's category set.
    pub fn assign_categories(
        &self,
        identifier: &str,
        categories: &[String],
    ) -> Result<Change<Vec<String>>> {
        self.mutate(|state| state.set_categories(identifier, categories))
    }

    /// Move a record to a 1-based display position.
    pub fn reorder(&self, identifier: &str, position: usize) -> Result<Change<()>> {
        self.mutate(|state| state.reorder(identifier, position))
    }

    /// Show or hide a record. Hidden records stay in the catalog.
    pub fn set_enabled(&self, identifier: &str, enabled: bool) -> Result<Change<()>> {
        self.mutate(|state| state.set_enabled(identifier, enabled))
    }

    /// Rename a record's title, propagating into the backing artifact's
    /// own `<title>` and heading.
    pub fn rename_title(&self, identifier: &str, new_title: &str) -> Result<Change<()>> {
        // Validate the record and artifact before the artifact write so a
        // failure leaves both files untouched.
        let (state, _) = self.store().load()?;
        if state.find(identifier).is_none() {
            return Err(VitrineError::RecordNotFound {
                identifier: identifier.to_string(),
            });
        }
        update_artifact_title(&self.config.artifacts_dir, identifier, new_title)?;

        self.mutate(|state| {
            let mut record = state
                .find(identifier)
                .cloned()
                .ok_or_else(|| VitrineError::RecordNotFound {
                    identifier: identifier.to_string(),
                })?;
            record.title = new_title.to_string();
            state.replace_record(record)
        })
    }

    /// Normalize any accumulated double escaping in stored titles and
    /// snippets. Returns whether the document changed.
    pub fn repair_entities(&self) -> Result<Change<bool>> {
        let store = self.store();
        let Some(original) = store.load_text()? else {
            return Ok(Change {
                value: false,
                snapshot: None,
            });
        };
        let state = document::parse(&original)?;
        let snapshot = self.backups().snapshot_document(&original)?;
        let rendered = store.save(&state, &original)?;
        Ok(Change {
            value: rendered != original,
            snapshot: Some(snapshot),
        })
    }

    // ========================================
    // Internals
    // ========================================

    fn store(&self) -> DocumentStore {
        DocumentStore::new(self.config.clone())
    }

    fn backups(&self) -> BackupManager {
        BackupManager::new(&self.config.backups_dir, self.config.document_stem())
    }

    /// Snapshot, apply, save. `apply` failing aborts with nothing written.
    fn mutate<T>(&self, apply: impl FnOnce(&mut CatalogState) -> Result<T>) -> Result<Change<T>> {
        let store = self.store();
        let prior_text = store.load_text()?;
        let (mut state, shell) = store.load()?;

        let value = apply(&mut state)?;

        let snapshot = match prior_text {
            Some(ref text) => Some(self.backups().snapshot_document(text)?),
            None => None,
        };
        store.save(&state, &shell)?;
        Ok(Change { value, snapshot })
    }
}

fn snapshot_kind(path: &Path) -> Result<SnapshotKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") => Ok(SnapshotKind::Document),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(SnapshotKind::Structured),
        _ => Err(VitrineError::InvalidBackup {
            message: format!("Unsupported snapshot format: {}", path.display()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(temp: &TempDir) -> Vitrine {
        let config = CatalogConfig::for_root(temp.path());
        std::fs::create_dir_all(&config.artifacts_dir).unwrap();
        Vitrine::new(config)
    }

    fn write_artifact(vitrine: &Vitrine, name: &str, title: &str) {
        std::fs::write(
            vitrine.config().artifacts_dir.join(name),
            format!(
                "<html><head><title>{t}</title></head><body>\
                 <h1 class=\"generated-title\">{t}</h1>\
                 <div id=\"report-content\"><p>Body.</p></div></body></html>",
                t = title
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_mutating_op_snapshots_first() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        vitrine.sync(false).unwrap();

        let change = vitrine.add_category("bioethics").unwrap();
        assert_eq!(change.value, "bioethics");
        let snapshot = change.snapshot.expect("snapshot of the prior document");
        // the snapshot predates the change
        assert!(!std::fs::read_to_string(snapshot).unwrap().contains("bioethics"));
        assert!(vitrine.categories().unwrap().contains(&"bioethics".to_string()));
    }

    #[test]
    fn test_rejected_mutation_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        vitrine.sync(false).unwrap();
        let snapshots_before = vitrine.list_snapshots().unwrap().len();
        let doc_before = std::fs::read_to_string(&vitrine.config().document_path).unwrap();

        let err = vitrine.reorder("r1.html", 7).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(vitrine.list_snapshots().unwrap().len(), snapshots_before);
        assert_eq!(
            std::fs::read_to_string(&vitrine.config().document_path).unwrap(),
            doc_before
        );
    }

    #[test]
    fn test_rename_title_propagates_to_artifact() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "Old Name");
        vitrine.sync(false).unwrap();

        vitrine.rename_title("r1.html", "New Name").unwrap();

        let records = vitrine.records().unwrap();
        assert_eq!(records[0].title, "New Name");
        let artifact = std::fs::read_to_string(vitrine.config().artifacts_dir.join("r1.html")).unwrap();
        assert!(artifact.contains("<title>New Name</title>"));
        assert!(artifact.contains(">New Name</h1>"));
    }

    #[test]
    fn test_rename_title_requires_artifact() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        vitrine.sync(false).unwrap();
        std::fs::remove_file(vitrine.config().artifacts_dir.join("r1.html")).unwrap();

        let err = vitrine.rename_title("r1.html", "X").unwrap_err();
        assert!(matches!(err, VitrineError::ArtifactNotFound { .. }));
        // catalog untouched
        assert_eq!(vitrine.records().unwrap()[0].title, "One");
    }

    #[test]
    fn test_restore_from_document_snapshot_resurrects_and_absorbs() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        write_artifact(&vitrine, "r2.html", "Two");
        vitrine.sync(false).unwrap();
        vitrine.assign_categories("r1.html", &["ethics".into()]).unwrap();

        // this change snapshots the curated document verbatim
        let snapshot = vitrine
            .add_category("placeholder")
            .unwrap()
            .snapshot
            .expect("curated document snapshot");
        assert_eq!(snapshot.extension().and_then(|e| e.to_str()), Some("html"));

        // then r1 is lost and pruned, and r3 appears
        std::fs::remove_file(vitrine.config().artifacts_dir.join("r1.html")).unwrap();
        vitrine.prune().unwrap();
        write_artifact(&vitrine, "r3.html", "Three");

        let outcome = vitrine.restore(&snapshot).unwrap();
        assert!(outcome.pre_restore_snapshot.is_some());
        assert_eq!(outcome.reconcile.created, vec!["r3.html"]);

        let records = vitrine.records().unwrap();
        let order: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        // r1 resurrected from the snapshot, r3 absorbed by the follow-up sync
        assert_eq!(order, vec!["r1.html", "r2.html", "r3.html"]);
        let positions: Vec<usize> = records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(records[0].categories, vec!["ethics"]);
        // the placeholder category postdates the snapshot and is gone again
        assert!(!vitrine.categories().unwrap().contains(&"placeholder".to_string()));
    }

    #[test]
    fn test_restore_rejects_unknown_format() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        let path = temp.path().join("backup.xml");
        std::fs::write(&path, "<backup/>").unwrap();
        assert!(matches!(
            vitrine.restore(&path).unwrap_err(),
            VitrineError::InvalidBackup { .. }
        ));
    }

    #[test]
    fn test_prune_removes_only_stale_records() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        write_artifact(&vitrine, "r2.html", "Two");
        vitrine.sync(false).unwrap();

        std::fs::remove_file(vitrine.config().artifacts_dir.join("r1.html")).unwrap();
        let change = vitrine.prune().unwrap();
        assert_eq!(change.value, vec!["r1.html"]);

        let records = vitrine.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "r2.html");
        assert_eq!(records[0].position, 1);
    }

    #[test]
    fn test_repair_entities_normalizes_document() {
        let temp = TempDir::new().unwrap();
        let vitrine = setup(&temp);
        write_artifact(&vitrine, "r1.html", "One");
        vitrine.sync(false).unwrap();

        // simulate an older tool having double-escaped a title
        let doc_path = &vitrine.config().document_path;
        let mangled = std::fs::read_to_string(doc_path)
            .unwrap()
            .replace("One", "Life &amp;amp; Death");
        std::fs::write(doc_path, mangled).unwrap();

        let change = vitrine.repair_entities().unwrap();
        assert!(change.value);
        let repaired = std::fs::read_to_string(doc_path).unwrap();
        assert!(repaired.contains("Life &amp; Death"));
        assert!(!repaired.contains("&amp;amp;"));

        // second pass is a no-op
        let change = vitrine.repair_entities().unwrap();
        assert!(!change.value);
    }
}
