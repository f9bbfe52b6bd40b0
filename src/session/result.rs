use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::quiz::QuizMode;
use crate::store::schema::WordEntry;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub category: String,
    pub mode: QuizMode,
    pub total: usize,
    pub answered: usize,
    pub score: usize,
    pub accuracy_percent: f64,
    pub misses: Vec<WordEntry>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn new(
        category: String,
        mode: QuizMode,
        total: usize,
        answered: usize,
        score: usize,
        misses: Vec<WordEntry>,
    ) -> Self {
        Self {
            category,
            mode,
            total,
            answered,
            score,
            accuracy_percent: accuracy_percent(score, total),
            misses,
            finished_at: Utc::now(),
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.misses.is_empty()
    }
}

/// `score / total * 100`, or 0 for an empty session.
pub fn accuracy_percent(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}
