//! Reconciliation of curated catalog state against the artifact directory.
//!
//! The merge runs under two hard rules:
//!
//! 1. Human curation is authoritative. A record that already exists is left
//!    untouched unless a refresh is explicitly requested, and even a refresh
//!    never clobbers the `enabled` flag.
//! 2. Disappearance is not deletion. The artifact directory is populated by
//!    an external process that can lag; a record whose artifact is missing
//!    is retained with all its curation intact. Deletion only ever happens
//!    through the explicit prune operation.
//!
//! Every run brackets its write: a verbatim snapshot of the prior document
//! before, a structured snapshot of the merged state after.

use crate::artifacts::list_artifacts;
use crate::backup::BackupManager;
use crate::config::CatalogConfig;
use crate::extract::MetadataExtractor;
use crate::record::ReportRecord;
use crate::state::CatalogState;
use crate::store::DocumentStore;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options for one reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Re-derive title/snippet/categories for records that already exist.
    /// Visibility is preserved regardless.
    pub refresh_existing: bool,
}

/// What a reconciliation run did.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Identifiers discovered on disk with no existing record.
    pub created: Vec<String>,
    /// Identifiers whose metadata was re-derived (refresh runs only).
    pub updated: Vec<String>,
    /// Records left untouched.
    pub unchanged: usize,
    /// Records whose artifact is currently missing from disk.
    pub retained: Vec<String>,
    /// Pre-run document snapshot (absent on the very first run).
    pub document_snapshot: Option<PathBuf>,
    /// Post-run structured snapshot.
    pub data_snapshot: PathBuf,
}

/// The reconciliation engine.
pub struct Reconciler<'a> {
    config: &'a CatalogConfig,
    extractor: &'a dyn MetadataExtractor,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a CatalogConfig, extractor: &'a dyn MetadataExtractor) -> Self {
        Self { config, extractor }
    }

    /// Run one reconciliation pass.
    ///
    /// Fails before any write on a structural document error or a missing
    /// artifact directory; the prior document is left untouched in both
    /// cases.
    pub fn run(&self, options: ReconcileOptions) -> Result<ReconcileOutcome> {
        let store = DocumentStore::new(self.config.clone());
        let backups = BackupManager::new(&self.config.backups_dir, self.config.document_stem());

        // Everything that can fail is done before the first write.
        let prior_text = store.load_text()?;
        let (mut state, shell) = store.load()?;
        let artifact_ids: BTreeSet<String> =
            list_artifacts(&self.config.artifacts_dir)?.into_iter().collect();

        let mut outcome = self.merge(&mut state, &artifact_ids, options)?;

        // Snapshot the pre-state, write the merged document, then dump the
        // post-state. A crash between the first two steps loses nothing.
        outcome.document_snapshot = match prior_text {
            Some(ref text) => Some(backups.snapshot_document(text)?),
            None => None,
        };
        store.save(&state, &shell)?;
        outcome.data_snapshot = backups.snapshot_structured(&state)?;

        info!(
            "Reconciled {}: {} created, {} updated, {} unchanged, {} retained",
            self.config.document_path.display(),
            outcome.created.len(),
            outcome.updated.len(),
            outcome.unchanged,
            outcome.retained.len()
        );
        Ok(outcome)
    }

    /// The merge itself: pure state manipulation, no I/O besides extraction.
    fn merge(
        &self,
        state: &mut CatalogState,
        artifact_ids: &BTreeSet<String>,
        options: ReconcileOptions,
    ) -> Result<ReconcileOutcome> {
        let mut created = Vec::new();
        let mut updated = Vec::new();
        let mut unchanged = 0usize;

        for identifier in artifact_ids {
            let artifact_path = self.config.artifacts_dir.join(identifier);
            match state.find(identifier).map(|r| r.enabled) {
                None => {
                    let meta = self.extractor.extract(&artifact_path, identifier);
                    debug!("New artifact {} -> \"{}\"", identifier, meta.title);
                    state.push_record(ReportRecord::new(
                        identifier.clone(),
                        meta.title,
                        meta.snippet,
                        meta.categories,
                    ));
                    created.push(identifier.clone());
                }
                Some(enabled) if options.refresh_existing => {
                    let meta = self.extractor.extract(&artifact_path, identifier);
                    let mut record = ReportRecord::new(
                        identifier.clone(),
                        meta.title,
                        meta.snippet,
                        meta.categories,
                    );
                    // a refresh re-derives content but never touches visibility
                    record.enabled = enabled;
                    state.replace_record(record)?;
                    updated.push(identifier.clone());
                }
                Some(_) => unchanged += 1,
            }
        }

        let retained: Vec<String> = state
            .order()
            .into_iter()
            .filter(|id| !artifact_ids.contains(id))
            .collect();

        Ok(ReconcileOutcome {
            created,
            updated,
            unchanged,
            retained,
            document_snapshot: None,
            data_snapshot: PathBuf::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HeuristicExtractor;
    use tempfile::TempDir;

    fn setup(temp: &TempDir) -> CatalogConfig {
        let config = CatalogConfig::for_root(temp.path());
        std::fs::create_dir_all(&config.artifacts_dir).unwrap();
        config
    }

    fn write_artifact(config: &CatalogConfig, name: &str, title: &str) {
        std::fs::write(
            config.artifacts_dir.join(name),
            format!(
                "<html><body><h1 class=\"generated-title\">{}</h1>\
                 <div id=\"report-content\"><p>Body of {}.</p></div></body></html>",
                title, title
            ),
        )
        .unwrap();
    }

    fn run(config: &CatalogConfig, refresh: bool) -> ReconcileOutcome {
        let extractor = HeuristicExtractor::default();
        Reconciler::new(config, &extractor)
            .run(ReconcileOptions {
                refresh_existing: refresh,
            })
            .unwrap()
    }

    fn load_state(config: &CatalogConfig) -> CatalogState {
        DocumentStore::new(config.clone()).load().unwrap().0
    }

    #[test]
    fn test_first_run_creates_document_and_records() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First Report");
        write_artifact(&config, "r2.html", "Second Report");

        let outcome = run(&config, false);
        assert_eq!(outcome.created, vec!["r1.html", "r2.html"]);
        assert!(outcome.document_snapshot.is_none());
        assert!(outcome.data_snapshot.exists());
        assert!(config.document_path.exists());

        let state = load_state(&config);
        assert_eq!(state.order(), vec!["r1.html", "r2.html"]);
        assert_eq!(state.find("r1.html").unwrap().title, "First Report");
        assert!(state.find("r1.html").unwrap().enabled);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");

        run(&config, false);
        let before = load_state(&config);

        let outcome = run(&config, false);
        assert!(outcome.created.is_empty());
        assert!(outcome.updated.is_empty());
        assert_eq!(outcome.unchanged, 1);
        assert_eq!(load_state(&config), before);
    }

    #[test]
    fn test_new_artifact_appends_without_touching_existing() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");
        write_artifact(&config, "r2.html", "Second");
        run(&config, false);

        // curate, then a third artifact appears
        {
            let store = DocumentStore::new(config.clone());
            let (mut state, shell) = store.load().unwrap();
            state.set_categories("r1.html", &["ethics".into()]).unwrap();
            store.save(&state, &shell).unwrap();
        }
        write_artifact(&config, "r3.html", "Third");

        let outcome = run(&config, false);
        assert_eq!(outcome.created, vec!["r3.html"]);
        assert_eq!(outcome.unchanged, 2);

        let state = load_state(&config);
        assert_eq!(state.order(), vec!["r1.html", "r2.html", "r3.html"]);
        assert_eq!(state.find("r1.html").unwrap().categories, vec!["ethics"]);
        assert!(state.find("r3.html").unwrap().enabled);
        let positions: Vec<usize> = state.all().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_disappearance_retains_curation() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");
        write_artifact(&config, "r2.html", "Second");
        run(&config, false);

        {
            let store = DocumentStore::new(config.clone());
            let (mut state, shell) = store.load().unwrap();
            state.set_categories("r1.html", &["ethics".into()]).unwrap();
            state.set_enabled("r1.html", false).unwrap();
            store.save(&state, &shell).unwrap();
        }

        std::fs::remove_file(config.artifacts_dir.join("r1.html")).unwrap();
        let outcome = run(&config, false);
        assert_eq!(outcome.retained, vec!["r1.html"]);

        let state = load_state(&config);
        let record = state.find("r1.html").unwrap();
        assert_eq!(record.title, "First");
        assert_eq!(record.categories, vec!["ethics"]);
        assert!(!record.enabled);
    }

    #[test]
    fn test_refresh_rederives_but_preserves_enabled() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "Original Title");
        run(&config, false);

        {
            let store = DocumentStore::new(config.clone());
            let (mut state, shell) = store.load().unwrap();
            state.set_enabled("r1.html", false).unwrap();
            store.save(&state, &shell).unwrap();
        }

        write_artifact(&config, "r1.html", "Rewritten Title");
        let outcome = run(&config, true);
        assert_eq!(outcome.updated, vec!["r1.html"]);

        let record = load_state(&config);
        let record = record.find("r1.html").unwrap();
        assert_eq!(record.title, "Rewritten Title");
        assert!(!record.enabled);
    }

    #[test]
    fn test_empty_directory_empties_cards_but_keeps_categories() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");
        run(&config, false);

        {
            let store = DocumentStore::new(config.clone());
            let (mut state, shell) = store.load().unwrap();
            state.add_category("handmade").unwrap();
            store.save(&state, &shell).unwrap();
        }

        std::fs::remove_file(config.artifacts_dir.join("r1.html")).unwrap();
        run(&config, false);

        let state = load_state(&config);
        // record retained (never auto-deleted), registry intact
        assert_eq!(state.len(), 1);
        assert!(state.categories().contains(&"handmade".to_string()));
    }

    #[test]
    fn test_missing_artifact_dir_aborts_before_write() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");
        run(&config, false);
        let before = std::fs::read_to_string(&config.document_path).unwrap();

        std::fs::remove_dir_all(&config.artifacts_dir).unwrap();
        let extractor = HeuristicExtractor::default();
        let err = Reconciler::new(&config, &extractor)
            .run(ReconcileOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::error::VitrineError::Config { .. }));
        assert_eq!(std::fs::read_to_string(&config.document_path).unwrap(), before);
    }

    #[test]
    fn test_snapshots_bracket_the_run() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        write_artifact(&config, "r1.html", "First");
        let first = run(&config, false);
        assert!(first.document_snapshot.is_none());

        write_artifact(&config, "r2.html", "Second");
        let second = run(&config, false);
        let snapshot = second.document_snapshot.expect("pre-run snapshot");
        // the pre-run snapshot holds the document as it was before r2 landed
        let content = std::fs::read_to_string(snapshot).unwrap();
        assert!(content.contains("r1.html"));
        assert!(!content.contains("r2.html"));
    }

    #[test]
    fn test_unextractable_artifact_gets_fallback_title() {
        let temp = TempDir::new().unwrap();
        let config = setup(&temp);
        std::fs::write(config.artifacts_dir.join("plain-notes.html"), "<p>x</p>").unwrap();

        let outcome = run(&config, false);
        assert_eq!(outcome.created, vec!["plain-notes.html"]);
        let state = load_state(&config);
        assert_eq!(state.find("plain-notes.html").unwrap().title, "plain notes");
    }
}
