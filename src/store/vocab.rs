use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{QuizError, Result};
use crate::store::schema::WordEntry;

/// In-memory word list loaded from `vocab.csv`.
#[derive(Clone, Debug, Default)]
pub struct VocabStore {
    entries: Vec<WordEntry>,
}

impl VocabStore {
    pub fn from_entries(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }

    /// Load `english,chinese,category` rows. A missing file is an error the
    /// caller is expected to report and replace with an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuizError::VocabularyMissing(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| QuizError::io(path, e))?;
        let entries = read_entries(file, path, MalformedRows::Skip)?;
        info!(path = %path.display(), words = entries.len(), "loaded vocabulary");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter_by_category(&self, category: &str) -> Result<Vec<WordEntry>> {
        let matching: Vec<WordEntry> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(QuizError::EmptyCategory(category.to_string()));
        }
        Ok(matching)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category) {
                seen.push(entry.category.clone());
            }
        }
        seen
    }
}

/// What to do with a row that does not deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MalformedRows {
    /// Log and drop it. Used for the read-only word list.
    Skip,
    /// Fail the whole read. Used for files that get written back.
    Reject,
}

/// Shared by the vocabulary and the ledger: header row required, fields
/// trimmed.
pub(crate) fn read_entries<R: std::io::Read>(
    reader: R,
    path: &Path,
    malformed: MalformedRows,
) -> Result<Vec<WordEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (i, row) in csv_reader.deserialize::<WordEntry>().enumerate() {
        match row {
            Ok(entry) => entries.push(entry.normalized()),
            Err(e) if e.is_io_error() || malformed == MalformedRows::Reject => {
                return Err(QuizError::csv(path, e));
            }
            Err(e) => {
                // +2: header line, 1-based
                warn!(path = %path.display(), line = i + 2, error = %e, "skipping malformed row");
            }
        }
    }
    Ok(entries)
}
