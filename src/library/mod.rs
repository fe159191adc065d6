//! # Template Persistence
//!
//! Named snapshots of a template's elements, kept in insertion order.
//! Names are not keys: two entries may share a name, and entries are
//! addressed by index.
//!
//! ```text
//! Template ──save(name)──▶ TemplateLibrary ──store_all──▶ LibraryStore (JSON file / memory)
//!    ▲                           │
//!    └──────load(index)──────────┘   (deep copy, selection cleared)
//! ```
//!
//! Export and import of portable documents live in [`document`].

pub mod document;
pub mod store;

pub use document::{ImportedDocument, TemplateDocument, export, export_file_name};
pub use store::{JsonFileStore, LibraryStore, MemoryStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{Result, TapecraftError};
use crate::template::Template;

/// One saved template. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTemplate {
    pub name: String,
    pub elements: Vec<Element>,
    pub created: DateTime<Utc>,
}

/// Listing entry for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub created: DateTime<Utc>,
    pub element_count: usize,
}

/// The saved-template library over some [`LibraryStore`].
pub struct TemplateLibrary<S: LibraryStore> {
    store: S,
    entries: Vec<SavedTemplate>,
}

impl<S: LibraryStore> TemplateLibrary<S> {
    /// Open a library, reading whatever the store already holds.
    pub fn open(store: S) -> Result<Self> {
        let entries = store.load_all()?;
        tracing::debug!(count = entries.len(), "template library opened");
        Ok(Self { store, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save a deep copy of `elements` under `name`.
    ///
    /// Returns the new entry's index. A blank name is a validation error, and
    /// a failed write leaves the library as it was.
    pub fn save(&mut self, name: &str, elements: &[Element]) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TapecraftError::Validation(
                "template name must not be empty".into(),
            ));
        }

        let mut next = self.entries.clone();
        next.push(SavedTemplate {
            name: name.to_string(),
            elements: elements.to_vec(),
            created: Utc::now(),
        });
        self.store.store_all(&next)?;
        self.entries = next;

        let index = self.entries.len() - 1;
        tracing::info!(name, index, count = elements.len(), "template saved");
        Ok(index)
    }

    /// `(index, name)` pairs in insertion order. Call again to restart.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> + Clone + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.name.as_str()))
    }

    /// Listing with metadata, for the HTTP surface.
    pub fn entries(&self) -> Vec<LibraryEntry<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, e)| LibraryEntry {
                index,
                name: &e.name,
                created: e.created,
                element_count: e.elements.len(),
            })
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&SavedTemplate> {
        self.entries.get(index)
    }

    /// Copy entry `index` into the live template. An invalid index does nothing.
    pub fn load(&self, index: usize, template: &mut Template) -> bool {
        match self.entries.get(index) {
            Some(saved) => {
                template.load_elements(&saved.elements);
                tracing::info!(name = %saved.name, index, "template loaded");
                true
            }
            None => false,
        }
    }

    /// Delete entry `index`. Later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<Option<SavedTemplate>> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.store.store_all(&next)?;
        self.entries = next;
        tracing::info!(name = %removed.name, index, "saved template deleted");
        Ok(Some(removed))
    }
}
