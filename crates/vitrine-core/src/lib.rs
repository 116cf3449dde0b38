//! Vitrine Core - headless library for curated report showcase management.
//!
//! A showcase is a single HTML document that is simultaneously the metadata
//! store and the rendered listing page for a directory of generated report
//! artifacts. This crate owns the whole lifecycle: parsing the document back
//! into typed catalog state, reconciling that state against the artifact
//! directory without disturbing human curation, rendering it back out, and
//! snapshotting around every write so no curation is ever unrecoverable.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_core::{CatalogConfig, Vitrine};
//!
//! fn main() -> vitrine_core::Result<()> {
//!     let vitrine = Vitrine::new(CatalogConfig::for_root("/srv/site"));
//!
//!     // Absorb new artifacts, keep existing curation untouched
//!     let outcome = vitrine.sync(false)?;
//!     println!("{} new reports", outcome.created.len());
//!
//!     // Curate
//!     vitrine.assign_categories("intro.html", &["ethics".into()])?;
//!     vitrine.reorder("intro.html", 1)?;
//!
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod backup;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod record;
pub mod reconcile;
pub mod state;
pub mod store;

mod api;

// Re-export commonly used types
pub use api::{Change, RestoreOutcome, Vitrine};
pub use backup::{BackupManager, SnapshotEntry, SnapshotKind, StructuredSnapshot};
pub use config::CatalogConfig;
pub use error::{Result, VitrineError};
pub use extract::{ExtractedMetadata, HeuristicExtractor, MetadataExtractor};
pub use reconcile::{ReconcileOptions, ReconcileOutcome, Reconciler};
pub use record::ReportRecord;
pub use state::CatalogState;
pub use store::DocumentStore;
