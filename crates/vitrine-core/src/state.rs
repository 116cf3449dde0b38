//! In-memory catalog state: ordered records plus the category registry.
//!
//! Record order IS the display order; `position` is renumbered densely
//! (1..=N) after every mutation so the two can never drift apart.
//! The registry is insertion-ordered and duplicate-free, and every key
//! referenced by a record is guaranteed to be present in it.

use crate::error::{Result, VitrineError};
use crate::record::{normalize_category_key, normalize_category_keys, ReportRecord};
use tracing::warn;

/// The full catalog: records in display order plus the category registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    records: Vec<ReportRecord>,
    categories: Vec<String>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a state from parsed or restored parts.
    ///
    /// Duplicate identifiers keep the first occurrence (the document is
    /// written wholesale by this process, so a duplicate means hand editing).
    /// Category keys are normalized, deduplicated, and extended with any key
    /// referenced by a record but missing from the registry.
    pub fn from_parts(records: Vec<ReportRecord>, categories: Vec<String>) -> Self {
        let mut state = Self::new();
        for key in categories {
            let key = normalize_category_key(&key);
            if !key.is_empty() && !state.categories.contains(&key) {
                state.categories.push(key);
            }
        }
        for record in records {
            if state.find(&record.identifier).is_some() {
                warn!("Duplicate record {} ignored", record.identifier);
                continue;
            }
            state.push_record(record);
        }
        state
    }

    // ========================================
    // Queries
    // ========================================

    /// All records in display order.
    pub fn all(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, identifier: &str) -> Option<&ReportRecord> {
        self.records.iter().find(|r| r.identifier == identifier)
    }

    fn find_mut(&mut self, identifier: &str) -> Option<&mut ReportRecord> {
        self.records.iter_mut().find(|r| r.identifier == identifier)
    }

    /// Registry keys in insertion order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Identifiers in display order.
    pub fn order(&self) -> Vec<String> {
        self.records.iter().map(|r| r.identifier.clone()).collect()
    }

    // ========================================
    // Record mutations
    // ========================================

    /// Append a record, absorbing its category keys into the registry.
    pub fn push_record(&mut self, mut record: ReportRecord) {
        record.categories = normalize_category_keys(&record.categories);
        for key in &record.categories {
            if !self.categories.contains(key) {
                self.categories.push(key.clone());
            }
        }
        self.records.push(record);
        self.renumber();
    }

    /// Replace a record's derived fields in place, keeping its position.
    pub fn replace_record(&mut self, record: ReportRecord) -> Result<()> {
        let identifier = record.identifier.clone();
        let slot = self
            .find_mut(&identifier)
            .ok_or(VitrineError::RecordNotFound { identifier })?;
        let position = slot.position;
        *slot = record;
        slot.position = position;
        let keys = slot.categories.clone();
        for key in keys {
            if !self.categories.contains(&key) {
                self.categories.push(key);
            }
        }
        Ok(())
    }

    /// Remove a record entirely. This is the only deletion path; routine
    /// reconciliation never calls it.
    pub fn remove_record(&mut self, identifier: &str) -> Option<ReportRecord> {
        let index = self.records.iter().position(|r| r.identifier == identifier)?;
        let record = self.records.remove(index);
        self.renumber();
        Some(record)
    }

    /// Move a record to a 1-based target position and renumber densely.
    pub fn reorder(&mut self, identifier: &str, new_position: usize) -> Result<()> {
        if new_position < 1 || new_position > self.records.len() {
            return Err(VitrineError::InvalidPosition {
                position: new_position,
                len: self.records.len(),
            });
        }
        let index = self
            .records
            .iter()
            .position(|r| r.identifier == identifier)
            .ok_or_else(|| VitrineError::RecordNotFound {
                identifier: identifier.to_string(),
            })?;
        let record = self.records.remove(index);
        self.records.insert(new_position - 1, record);
        self.renumber();
        Ok(())
    }

    /// Replace a record's category set. Unseen keys are absorbed into the
    /// registry so record categories always stay a subset of it.
    pub fn set_categories(&mut self, identifier: &str, categories: &[String]) -> Result<Vec<String>> {
        let normalized = normalize_category_keys(categories);
        let record = self
            .find_mut(identifier)
            .ok_or_else(|| VitrineError::RecordNotFound {
                identifier: identifier.to_string(),
            })?;
        record.categories = normalized.clone();
        for key in &normalized {
            if !self.categories.contains(key) {
                self.categories.push(key.clone());
            }
        }
        Ok(normalized)
    }

    /// Set a record's visibility flag.
    pub fn set_enabled(&mut self, identifier: &str, enabled: bool) -> Result<()> {
        let record = self
            .find_mut(identifier)
            .ok_or_else(|| VitrineError::RecordNotFound {
                identifier: identifier.to_string(),
            })?;
        record.enabled = enabled;
        Ok(())
    }

    // ========================================
    // Category registry mutations
    // ========================================

    /// Add a category key to the registry.
    pub fn add_category(&mut self, raw: &str) -> Result<String> {
        let key = normalize_category_key(raw);
        if key.is_empty() {
            return Err(VitrineError::Config {
                message: "Category key is empty after normalization".to_string(),
            });
        }
        if self.categories.contains(&key) {
            return Err(VitrineError::DuplicateCategory { key });
        }
        self.categories.push(key.clone());
        Ok(key)
    }

    /// Rename a category key, cascading to every record that references it.
    ///
    /// Renaming onto an existing key is rejected with no state change.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<(String, String)> {
        let old_key = normalize_category_key(old);
        let new_key = normalize_category_key(new);
        if !self.categories.contains(&old_key) {
            return Err(VitrineError::CategoryNotFound { key: old_key });
        }
        if new_key.is_empty() {
            return Err(VitrineError::Config {
                message: "Category key is empty after normalization".to_string(),
            });
        }
        if self.categories.contains(&new_key) {
            return Err(VitrineError::DuplicateCategory { key: new_key });
        }
        for slot in self.categories.iter_mut() {
            if *slot == old_key {
                *slot = new_key.clone();
            }
        }
        for record in self.records.iter_mut() {
            for key in record.categories.iter_mut() {
                if *key == old_key {
                    *key = new_key.clone();
                }
            }
        }
        Ok((old_key, new_key))
    }

    /// Drop a category from the registry and from every record's set.
    /// Records themselves are never deleted. Returns how many records
    /// referenced the key.
    pub fn delete_category(&mut self, raw: &str) -> Result<usize> {
        let key = normalize_category_key(raw);
        if !self.categories.contains(&key) {
            return Err(VitrineError::CategoryNotFound { key });
        }
        self.categories.retain(|c| c != &key);
        let mut touched = 0;
        for record in self.records.iter_mut() {
            let before = record.categories.len();
            record.categories.retain(|c| c != &key);
            if record.categories.len() != before {
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Restore the dense 1..=N position invariant.
    fn renumber(&mut self) {
        for (index, record) in self.records.iter_mut().enumerate() {
            record.position = index + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> CatalogState {
        let mut state = CatalogState::new();
        state.push_record(ReportRecord::new("r1.html", "One", "s1", vec!["ethics".into()]));
        state.push_record(ReportRecord::new("r2.html", "Two", "s2", vec!["health".into()]));
        state.push_record(ReportRecord::new("r3.html", "Three", "s3", vec![]));
        state
    }

    fn positions(state: &CatalogState) -> Vec<usize> {
        state.all().iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_push_assigns_dense_positions() {
        let state = sample_state();
        assert_eq!(positions(&state), vec![1, 2, 3]);
        assert_eq!(state.categories(), &["ethics", "health"]);
    }

    #[test]
    fn test_from_parts_ignores_duplicates() {
        let records = vec![
            ReportRecord::new("a.html", "A", "s", vec![]),
            ReportRecord::new("a.html", "A again", "s", vec![]),
            ReportRecord::new("b.html", "B", "s", vec![]),
        ];
        let state = CatalogState::from_parts(records, vec!["Ethics".into(), "ethics".into()]);
        assert_eq!(state.len(), 2);
        assert_eq!(state.find("a.html").unwrap().title, "A");
        assert_eq!(state.categories(), &["ethics"]);
    }

    #[test]
    fn test_reorder_moves_and_renumbers() {
        let mut state = sample_state();
        state.reorder("r3.html", 1).unwrap();
        assert_eq!(state.order(), vec!["r3.html", "r1.html", "r2.html"]);
        assert_eq!(positions(&state), vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_out_of_range_rejected() {
        let mut state = sample_state();
        let err = state.reorder("r1.html", 4).unwrap_err();
        assert!(matches!(err, VitrineError::InvalidPosition { position: 4, len: 3 }));
        let err = state.reorder("r1.html", 0).unwrap_err();
        assert!(matches!(err, VitrineError::InvalidPosition { position: 0, .. }));
        // no state change on rejection
        assert_eq!(state.order(), vec!["r1.html", "r2.html", "r3.html"]);
    }

    #[test]
    fn test_remove_renumbers_densely() {
        let mut state = sample_state();
        state.remove_record("r2.html").unwrap();
        assert_eq!(positions(&state), vec![1, 2]);
        assert_eq!(state.order(), vec!["r1.html", "r3.html"]);
    }

    #[test]
    fn test_set_categories_absorbs_new_keys() {
        let mut state = sample_state();
        let applied = state
            .set_categories("r3.html", &["Social Issues".into(), "ethics".into()])
            .unwrap();
        assert_eq!(applied, vec!["social-issues", "ethics"]);
        assert!(state.categories().contains(&"social-issues".to_string()));
    }

    #[test]
    fn test_rename_category_cascades() {
        let mut state = sample_state();
        state.rename_category("ethics", "moral philosophy").unwrap();
        assert_eq!(state.categories(), &["moral-philosophy", "health"]);
        assert_eq!(state.find("r1.html").unwrap().categories, vec!["moral-philosophy"]);
    }

    #[test]
    fn test_rename_onto_existing_rejected() {
        let mut state = sample_state();
        let err = state.rename_category("ethics", "health").unwrap_err();
        assert!(matches!(err, VitrineError::DuplicateCategory { .. }));
        // untouched
        assert_eq!(state.categories(), &["ethics", "health"]);
        assert_eq!(state.find("r1.html").unwrap().categories, vec!["ethics"]);
    }

    #[test]
    fn test_delete_category_cascades_without_deleting_records() {
        let mut state = sample_state();
        let touched = state.delete_category("ethics").unwrap();
        assert_eq!(touched, 1);
        assert_eq!(state.categories(), &["health"]);
        assert_eq!(state.len(), 3);
        assert!(state.find("r1.html").unwrap().categories.is_empty());
    }

    #[test]
    fn test_add_category_duplicate_rejected() {
        let mut state = sample_state();
        assert_eq!(state.add_category("Bio Ethics").unwrap(), "bio-ethics");
        let err = state.add_category("bio ethics").unwrap_err();
        assert!(matches!(err, VitrineError::DuplicateCategory { .. }));
    }

    #[test]
    fn test_set_enabled() {
        let mut state = sample_state();
        state.set_enabled("r1.html", false).unwrap();
        assert!(!state.find("r1.html").unwrap().enabled);
        let err = state.set_enabled("missing.html", true).unwrap_err();
        assert!(matches!(err, VitrineError::RecordNotFound { .. }));
    }
}
