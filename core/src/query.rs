//! Two-way sync between the URL bar and the query-parameter table.
//!
//! # Design
//! `QuerySync` owns the URL text and the parameter rows. Editing the URL
//! re-derives the rows (`pull`); editing a row re-derives the query string
//! (`push`). Both persist the URL text to the target store. Sync works on
//! raw text: nothing is percent-encoded or decoded, so what the user typed
//! on one side is exactly what shows up on the other.

use crate::rows::{KeyValueRow, RowTable};
use crate::store::TargetStore;

pub struct QuerySync {
    target: String,
    rows: RowTable,
    store: Box<dyn TargetStore>,
    storage_key: String,
}

impl std::fmt::Debug for QuerySync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySync")
            .field("target", &self.target)
            .field("rows", &self.rows)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl QuerySync {
    /// Empty URL bar and a single blank row.
    pub fn new(storage_key: impl Into<String>, store: Box<dyn TargetStore>) -> Self {
        Self {
            target: String::new(),
            rows: RowTable::new(),
            store,
            storage_key: storage_key.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        self.rows.rows()
    }

    /// The last target persisted for this key, if any.
    pub fn stored_target(&self) -> Option<String> {
        self.store.load(&self.storage_key)
    }

    /// Replace the URL text without touching the rows.
    pub fn replace_target(&mut self, target: &str) {
        self.target = target.to_string();
    }

    /// URL bar edit: take the new text and re-derive the rows from it.
    pub fn set_target(&mut self, target: &str) {
        self.replace_target(target);
        self.pull();
    }

    /// Replace the rows without touching the URL text. The table ends with
    /// one blank row.
    pub fn replace_rows<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.rows.fill(pairs);
    }

    /// Re-derive the rows from the URL's query string.
    ///
    /// Fragments overwrite rows position by position; `value` is empty when
    /// a fragment has no `=` or starts with one. The table always ends with
    /// exactly one blank row. A URL without a query (or with a bare `?`)
    /// leaves only that blank row.
    pub fn pull(&mut self) {
        self.persist();

        let query = match self.target.split_once('?') {
            Some((_, query)) if !query.trim().is_empty() => query,
            _ => {
                self.rows.clear();
                return;
            }
        };

        let fragments: Vec<(String, String)> = query.split('&').map(split_fragment).collect();
        tracing::trace!(count = fragments.len(), "pulled query parameters from target");
        self.rows.fill(fragments);
    }

    /// Re-derive the URL's query string from the rows.
    ///
    /// Rows whose trimmed key is empty are skipped. With no contributing row
    /// the query string is removed; otherwise everything after the first `?`
    /// is replaced.
    pub fn push(&mut self) {
        let query = self
            .rows
            .pairs()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let trimmed = self.target.trim();
        let base = trimmed.split_once('?').map_or(trimmed, |(base, _)| base);
        self.target = if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        };
        tracing::trace!(target_url = %self.target, "pushed query parameters to target");

        self.persist();
    }

    /// Key edit in row `index`: sync the URL, then keep exactly one trailing
    /// blank row.
    pub fn on_row_key_changed(&mut self, index: usize) {
        self.push();
        self.rows.on_key_changed(index);
    }

    pub fn on_row_value_changed(&mut self, _index: usize) {
        self.push();
    }

    /// Set the key of row `index` and sync. Out-of-range rows are ignored.
    pub fn set_row_key(&mut self, index: usize, key: &str) {
        if !self.rows.set_key(index, key) {
            tracing::warn!(index, rows = self.rows.len(), "ignoring key edit for missing row");
            return;
        }
        self.on_row_key_changed(index);
    }

    /// Set the value of row `index` and sync. Out-of-range rows are ignored.
    pub fn set_row_value(&mut self, index: usize, value: &str) {
        if !self.rows.set_value(index, value) {
            tracing::warn!(index, rows = self.rows.len(), "ignoring value edit for missing row");
            return;
        }
        self.on_row_value_changed(index);
    }

    /// Write the trimmed URL text to the store. Failures are logged and
    /// otherwise ignored.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.storage_key, self.target.trim()) {
            tracing::warn!(key = %self.storage_key, error = %err, "could not persist request target");
        }
    }
}

fn split_fragment(fragment: &str) -> (String, String) {
    let fragment = fragment.trim();
    match fragment.split_once('=') {
        Some((key, value)) if !key.is_empty() => (key.to_string(), value.to_string()),
        Some(_) => (String::new(), String::new()),
        None => (fragment.to_string(), String::new()),
    }
}
