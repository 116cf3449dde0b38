//! Document persistence.
//!
//! [`DocumentStore`] is the only reader/writer of the showcase file. It
//! loads the raw text, hands parsing and rendering to the document model,
//! and persists results through the atomic write path.

pub mod atomic;

pub use atomic::{atomic_write_json, atomic_write_text, read_json, read_text};

use crate::config::CatalogConfig;
use crate::document;
use crate::error::Result;
use crate::state::CatalogState;
use std::path::Path;
use tracing::debug;

/// Loads and saves the showcase document for one catalog.
pub struct DocumentStore {
    config: CatalogConfig,
}

impl DocumentStore {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn document_path(&self) -> &Path {
        &self.config.document_path
    }

    /// Raw document text, or `None` when no document exists yet.
    pub fn load_text(&self) -> Result<Option<String>> {
        read_text(&self.config.document_path)
    }

    /// Current state plus the shell it was read from.
    ///
    /// When the document is absent, an empty state over the built-in default
    /// shell is synthesized.
    pub fn load(&self) -> Result<(CatalogState, String)> {
        match self.load_text()? {
            Some(text) => {
                let state = document::parse(&text)?;
                Ok((state, text))
            }
            None => {
                debug!(
                    "No document at {}, synthesizing empty showcase",
                    self.config.document_path.display()
                );
                Ok((CatalogState::new(), document::default_document()))
            }
        }
    }

    /// Render `state` into `shell` and atomically replace the document.
    /// Returns the rendered text.
    pub fn save(&self, state: &CatalogState, shell: &str) -> Result<String> {
        let rendered = document::render(state, shell, &self.config.link_prefix())?;
        atomic_write_text(&self.config.document_path, &rendered)?;
        Ok(rendered)
    }

    /// Replace the document with verbatim text (used by restore).
    pub fn save_text(&self, text: &str) -> Result<()> {
        atomic_write_text(&self.config.document_path, text)
    }
}
