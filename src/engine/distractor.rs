use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::session::quiz::QuizMode;
use crate::store::schema::WordEntry;

pub const OPTION_COUNT: usize = 4;
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Spellings within this many edits of the answer count as look-alikes.
pub const MAX_EDIT_DISTANCE: usize = 3;

const KEYWORD_CHARS: usize = 2;

/// Last two characters of a gloss, or the whole gloss when shorter.
pub fn gloss_keyword(gloss: &str) -> &str {
    let count = gloss.chars().count();
    if count <= KEYWORD_CHARS {
        return gloss;
    }
    let start = gloss
        .char_indices()
        .nth(count - KEYWORD_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &gloss[start..]
}

/// Levenshtein distance from `target` to each word. Pure; the pool is not
/// touched.
pub fn edit_distances<'a>(words: &[&'a str], target: &str) -> Vec<(&'a str, usize)> {
    words
        .iter()
        .map(|w| (*w, strsim::levenshtein(w, target)))
        .collect()
}

/// Distinct values of one field, in pool order.
pub fn distinct_values<'a>(pool: &'a [WordEntry], field: impl Fn(&'a WordEntry) -> &'a str) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(pool.len());
    pool.iter()
        .map(field)
        .filter(|value| seen.insert(*value))
        .collect()
}

/// Glosses sharing the correct gloss's keyword.
pub fn similar_glosses<'a>(glosses: &[&'a str], correct: &str) -> Vec<&'a str> {
    let keyword = gloss_keyword(correct);
    glosses
        .iter()
        .copied()
        .filter(|g| *g != correct && g.contains(keyword))
        .collect()
}

/// Spellings 1..=MAX_EDIT_DISTANCE edits away from the correct word.
pub fn similar_spellings<'a>(words: &[&'a str], correct: &str) -> Vec<&'a str> {
    edit_distances(words, correct)
        .into_iter()
        .filter(|(w, d)| *w != correct && (1..=MAX_EDIT_DISTANCE).contains(d))
        .map(|(w, _)| w)
        .collect()
}

/// Draw up to `DISTRACTOR_COUNT` distinct wrong answers, look-alikes first,
/// then anything from the fallback. Each list is walked once, so a small
/// pool yields fewer distractors instead of spinning.
pub fn pick_distractors<R: Rng>(
    mut similar: Vec<&str>,
    mut fallback: Vec<&str>,
    correct: &str,
    rng: &mut R,
) -> Vec<String> {
    similar.shuffle(rng);
    fallback.shuffle(rng);

    let mut picked: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);
    for candidate in similar.into_iter().chain(fallback) {
        if picked.len() == DISTRACTOR_COUNT {
            break;
        }
        if candidate != correct && !picked.iter().any(|p| p == candidate) {
            picked.push(candidate.to_string());
        }
    }
    picked
}

/// Correct answer plus distractors, shuffled. Holds `OPTION_COUNT` options
/// unless the pool has fewer distinct values for the answer field.
pub fn build_options<R: Rng>(
    pool: &[WordEntry],
    correct_entry: &WordEntry,
    mode: QuizMode,
    rng: &mut R,
) -> Vec<String> {
    let correct = mode.answer_of(correct_entry);
    let values = distinct_values(pool, |e| mode.answer_of(e));
    let similar = match mode {
        QuizMode::EnglishToChinese => similar_glosses(&values, correct),
        QuizMode::ChineseToEnglish => similar_spellings(&values, correct),
    };

    let mut options = vec![correct.to_string()];
    options.extend(pick_distractors(similar, values, correct, rng));
    if options.len() < OPTION_COUNT {
        warn!(
            answer = correct,
            options = options.len(),
            "vocabulary pool too small for a full option set"
        );
    }
    options.shuffle(rng);
    options
}
