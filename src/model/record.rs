//! Search results: one record per matching message.

use std::path::{Path, PathBuf};

use super::message::ParsedMessage;

/// A message that satisfied every search term.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    /// Archive the message came from.
    pub archive: PathBuf,

    /// Position of the message inside that archive (not the display index).
    pub ordinal: u64,

    /// Decoded message captured at match time.
    pub message: ParsedMessage,
}

impl MatchRecord {
    /// File name of the archive, for list display.
    pub fn archive_name(&self) -> String {
        self.archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.archive.display().to_string())
    }
}

/// Ordered search results.
///
/// Insertion order is archive discovery order, then ordinal. Display
/// indices handed to the operator are 1-based positions in this list.
#[derive(Debug, Clone, Default)]
pub struct ResultsIndex {
    records: Vec<MatchRecord>,
}

impl ResultsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, archive: &Path, ordinal: u64, message: ParsedMessage) {
        self.records.push(MatchRecord {
            archive: archive.to_path_buf(),
            ordinal,
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by its 1-based display index.
    pub fn by_display_index(&self, index: usize) -> Option<&MatchRecord> {
        index.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ResultsIndex {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
