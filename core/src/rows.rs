//! Editable key/value tables with a trailing blank row.
//!
//! Both the query-parameter table and the request-header table follow the
//! same discipline: populated rows are followed by exactly one blank row so
//! the user always has somewhere to type the next entry.

/// One editable key/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    /// Empty on both sides once trimmed.
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }

    /// Whether the row contributes an entry (its trimmed key is non-empty).
    pub fn has_key(&self) -> bool {
        !self.key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTable {
    rows: Vec<KeyValueRow>,
}

impl Default for RowTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RowTable {
    /// A table holding only the trailing blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![KeyValueRow::blank()],
        }
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyValueRow> {
        self.rows.get(index)
    }

    /// Returns `false` when `index` is out of range.
    pub fn set_key(&mut self, index: usize, key: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.key = key.to_string();
                true
            }
            None => false,
        }
    }

    /// Returns `false` when `index` is out of range.
    pub fn set_value(&mut self, index: usize, value: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Keep the trailing blank row consistent after the key at `index` was
    /// edited.
    ///
    /// A second-to-last row emptied on both sides absorbs the trailing blank
    /// row; a last row that gained a key gets a new blank row after it. The
    /// trailing row is only dropped while it is itself blank.
    pub fn on_key_changed(&mut self, index: usize) {
        let count = self.rows.len();
        let Some(row) = self.rows.get(index) else {
            return;
        };
        let has_key = row.has_key();

        if index + 2 == count && row.is_blank() && self.rows[count - 1].is_blank() {
            self.rows.pop();
        }

        if has_key && index + 1 == count {
            self.rows.push(KeyValueRow::blank());
        }
    }

    /// Overwrite rows in place with `pairs`, drop the leftovers and end with
    /// one blank row. Blank pairs at the tail fold into that row; blank pairs
    /// between populated ones keep their position.
    pub fn fill<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut filled = 0;
        for (key, value) in pairs {
            let row = KeyValueRow::new(key, value);
            match self.rows.get_mut(filled) {
                Some(existing) => *existing = row,
                None => self.rows.push(row),
            }
            filled += 1;
        }
        self.rows.truncate(filled);
        while self.rows.last().is_some_and(KeyValueRow::is_blank) {
            self.rows.pop();
        }
        self.rows.push(KeyValueRow::blank());
    }

    /// Reset to the single trailing blank row.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows.push(KeyValueRow::blank());
    }

    /// Trimmed `(key, value)` of every row with a non-empty key, in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .iter()
            .filter(|row| row.has_key())
            .map(|row| (row.key.trim(), row.value.trim()))
    }
}
