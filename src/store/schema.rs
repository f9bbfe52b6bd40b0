use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

/// One row of `vocab.csv`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordEntry {
    pub english: String,
    pub chinese: String,
    pub category: String,
}

/// Ledger rows share the vocabulary layout; dedup key is `(english, category)`.
pub type WrongWordRecord = WordEntry;

impl WordEntry {
    pub fn new(english: &str, chinese: &str, category: &str) -> Self {
        Self {
            english: english.to_string(),
            chinese: chinese.to_string(),
            category: category.to_string(),
        }
    }

    /// NFC-normalize every field so glosses typed with different input
    /// methods compare equal.
    pub fn normalized(self) -> Self {
        let nfc = ComposingNormalizerBorrowed::new_nfc();
        Self {
            english: nfc.normalize(&self.english).into_owned(),
            chinese: nfc.normalize(&self.chinese).into_owned(),
            category: nfc.normalize(&self.category).into_owned(),
        }
    }

    pub fn ledger_key(&self) -> (&str, &str) {
        (&self.english, &self.category)
    }
}

/// Category filter for the wrong-word review.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, entry: &WordEntry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => entry.category == *category,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(category) => category,
        }
    }
}
