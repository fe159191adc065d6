//! Storage backends for the saved-template library.

use std::fs;
use std::path::{Path, PathBuf};

use super::SavedTemplate;
use crate::error::{Result, TapecraftError};

/// Where the library lives. The whole library is read and written at once.
pub trait LibraryStore: Send {
    fn load_all(&self) -> Result<Vec<SavedTemplate>>;

    /// Replace the stored library. Either every entry is written or none is.
    fn store_all(&mut self, entries: &[SavedTemplate]) -> Result<()>;
}

impl LibraryStore for Box<dyn LibraryStore> {
    fn load_all(&self) -> Result<Vec<SavedTemplate>> {
        (**self).load_all()
    }

    fn store_all(&mut self, entries: &[SavedTemplate]) -> Result<()> {
        (**self).store_all(entries)
    }
}

/// One pretty-printed JSON array on disk.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write leaves the previous library intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "library.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LibraryStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<SavedTemplate>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            TapecraftError::Format(format!(
                "template library {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn store_all(&mut self, entries: &[SavedTemplate]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), count = entries.len(), "template library written");
        Ok(())
    }
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<SavedTemplate>,
    /// When set, the next `store_all` fails without writing.
    fail_next_write: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<SavedTemplate>) -> Self {
        Self {
            entries,
            fail_next_write: false,
        }
    }

    /// Make the next write fail, to exercise error paths.
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }
}

impl LibraryStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<SavedTemplate>> {
        Ok(self.entries.clone())
    }

    fn store_all(&mut self, entries: &[SavedTemplate]) -> Result<()> {
        if std::mem::take(&mut self.fail_next_write) {
            return Err(std::io::Error::other("simulated write failure").into());
        }
        self.entries = entries.to_vec();
        Ok(())
    }
}
