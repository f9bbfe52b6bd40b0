use std::path::PathBuf;

use thiserror::Error;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 50;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("question count must be a whole number between 1 and 50 (got {0:?})")]
    InvalidQuestionCount(String),

    #[error("no vocabulary for category {0}")]
    EmptyCategory(String),

    #[error("vocabulary file not found: {}", .0.display())]
    VocabularyMissing(PathBuf),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl QuizError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
