//! Durable slot for the last request target.
//!
//! The playground remembers a single value: the trimmed URL bar text, under
//! `"<namespace>@http-request-target"`. Storage may be missing entirely, so
//! callers treat every failure as "nothing stored" and carry on.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub trait TargetStore {
    /// The stored value, or `None` when nothing is stored or storage is
    /// unavailable.
    fn load(&self, key: &str) -> Option<String>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, lost when the session ends.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TargetStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persistence switched off: nothing loads, every save fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl TargetStore for DisabledStore {
    fn load(&self, _key: &str) -> Option<String> {
        None
    }

    fn save(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Key-value pairs kept as one JSON object in a file.
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

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TargetStore for JsonFileStore {
    fn load(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read target store");
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}
