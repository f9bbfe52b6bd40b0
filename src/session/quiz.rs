use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::distractor;
use crate::error::{MAX_QUESTIONS, MIN_QUESTIONS, QuizError, Result};
use crate::session::result::SessionSummary;
use crate::store::ledger::WrongWordLedger;
use crate::store::schema::WordEntry;
use crate::store::vocab::VocabStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Show the English word, pick the Chinese gloss.
    #[default]
    EnglishToChinese,
    /// Show the Chinese gloss, pick the English word.
    ChineseToEnglish,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::EnglishToChinese => "english_to_chinese",
            QuizMode::ChineseToEnglish => "chinese_to_english",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuizMode::EnglishToChinese => "English → Chinese",
            QuizMode::ChineseToEnglish => "Chinese → English",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            QuizMode::EnglishToChinese => QuizMode::ChineseToEnglish,
            QuizMode::ChineseToEnglish => QuizMode::EnglishToChinese,
        }
    }

    pub fn prompt_of(self, entry: &WordEntry) -> &str {
        match self {
            QuizMode::EnglishToChinese => &entry.english,
            QuizMode::ChineseToEnglish => &entry.chinese,
        }
    }

    pub fn answer_of(self, entry: &WordEntry) -> &str {
        match self {
            QuizMode::EnglishToChinese => &entry.chinese,
            QuizMode::ChineseToEnglish => &entry.english,
        }
    }
}

/// Parse the question-count field: a whole number in `[1, 50]`.
pub fn parse_question_count(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&n) => Ok(n),
        _ => Err(QuizError::InvalidQuestionCount(trimmed.to_string())),
    }
}

#[derive(Clone, Debug)]
pub struct Question {
    pub number: usize,
    pub prompt_entry: WordEntry,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub mode: QuizMode,
}

impl Question {
    pub fn prompt(&self) -> &str {
        self.mode.prompt_of(&self.prompt_entry)
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

#[derive(Clone, Debug)]
pub enum Round {
    Question(Question),
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
}

pub struct QuizSession {
    category: String,
    mode: QuizMode,
    total_questions: usize,
    current_index: usize,
    score: usize,
    answered: usize,
    // number of the last question that was scored
    answered_number: Option<usize>,
    current_wrong_words: Vec<WordEntry>,
    pool: Vec<WordEntry>,
}

impl QuizSession {
    pub fn start(
        store: &VocabStore,
        category: &str,
        mode: QuizMode,
        question_count: usize,
    ) -> Result<Self> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            return Err(QuizError::InvalidQuestionCount(question_count.to_string()));
        }
        let pool = store.filter_by_category(category)?;
        info!(
            category,
            mode = mode.as_str(),
            questions = question_count,
            pool = pool.len(),
            "session started"
        );
        Ok(Self {
            category: category.to_string(),
            mode,
            total_questions: question_count,
            current_index: 0,
            score: 0,
            answered: 0,
            answered_number: None,
            current_wrong_words: Vec::new(),
            pool,
        })
    }

    /// Advance to the next question, or report completion once the
    /// configured count has been used up.
    pub fn next_question<R: Rng>(&mut self, rng: &mut R) -> Round {
        if self.current_index > self.total_questions {
            return Round::Complete;
        }
        self.current_index += 1;
        if self.current_index > self.total_questions {
            return Round::Complete;
        }

        // pool is non-empty: start() rejects empty categories
        let Some(entry) = self.pool.choose(rng) else {
            return Round::Complete;
        };
        let options = distractor::build_options(&self.pool, entry, self.mode, rng);
        let correct_answer = self.mode.answer_of(entry).to_string();
        debug!(
            number = self.current_index,
            prompt = self.mode.prompt_of(entry),
            options = options.len(),
            "question drawn"
        );

        Round::Question(Question {
            number: self.current_index,
            prompt_entry: entry.clone(),
            options,
            correct_answer,
            mode: self.mode,
        })
    }

    /// Score `selected` against the open question. Each question counts once:
    /// answering it again, answering a question that is not the open one, or
    /// answering after completion reports the outcome without scoring it.
    pub fn check_answer(&mut self, question: &Question, selected: &str) -> AnswerOutcome {
        let correct = selected == question.correct_answer;
        let outcome = AnswerOutcome {
            correct,
            correct_answer: question.correct_answer.clone(),
        };
        if self.is_complete()
            || question.number != self.current_index
            || self.answered_number == Some(question.number)
        {
            debug!(number = question.number, "ignoring repeated answer");
            return outcome;
        }

        self.answered += 1;
        self.answered_number = Some(question.number);
        if correct {
            self.score += 1;
        } else if !self
            .current_wrong_words
            .iter()
            .any(|w| w.english == question.prompt_entry.english)
        {
            self.current_wrong_words.push(question.prompt_entry.clone());
        }
        outcome
    }

    /// Close the session and fold its misses into the ledger. The summary is
    /// returned alongside any ledger error so a failed write never hides the
    /// score.
    pub fn end(self, ledger: &mut WrongWordLedger) -> (SessionSummary, Option<QuizError>) {
        let save_error = ledger.merge_and_save(&self.current_wrong_words).err();
        let summary = SessionSummary::new(
            self.category,
            self.mode,
            self.total_questions,
            self.answered,
            self.score,
            self.current_wrong_words,
        );
        info!(
            score = summary.score,
            total = summary.total,
            accuracy = summary.accuracy_percent,
            misses = summary.misses.len(),
            "session ended"
        );
        (summary, save_error)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn current_number(&self) -> usize {
        self.current_index.min(self.total_questions)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn current_wrong_words(&self) -> &[WordEntry] {
        &self.current_wrong_words
    }

    pub fn is_complete(&self) -> bool {
        self.current_index > self.total_questions
    }

    pub fn progress(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total_questions as f64
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use tempfile::TempDir;

    use super::*;

    fn store() -> VocabStore {
        VocabStore::from_entries(vec![
            WordEntry::new("abandon", "放弃", "四级"),
            WordEntry::new("ability", "能力", "四级"),
            WordEntry::new("able", "能够的", "四级"),
            WordEntry::new("aboard", "在船上", "四级"),
            WordEntry::new("abolish", "废除", "四级"),
            WordEntry::new("academic", "学术的", "六级"),
        ])
    }

    fn expect_question(session: &mut QuizSession, rng: &mut SmallRng) -> Question {
        match session.next_question(rng) {
            Round::Question(q) => q,
            Round::Complete => panic!("session ended early"),
        }
    }

    fn wrong_option(q: &Question) -> String {
        q.options
            .iter()
            .find(|o| **o != q.correct_answer)
            .cloned()
            .unwrap_or_else(|| "not an option".to_string())
    }

    #[test]
    fn parse_question_count_accepts_range() {
        assert_eq!(parse_question_count("1").unwrap(), 1);
        assert_eq!(parse_question_count(" 50 ").unwrap(), 50);
        assert_eq!(parse_question_count("10").unwrap(), 10);
    }

    #[test]
    fn parse_question_count_rejects_bad_input() {
        for input in ["0", "51", "-3", "ten", "", "2.5"] {
            assert!(
                matches!(parse_question_count(input), Err(QuizError::InvalidQuestionCount(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn start_rejects_out_of_range_count() {
        let store = store();
        assert!(QuizSession::start(&store, "四级", QuizMode::EnglishToChinese, 0).is_err());
        assert!(QuizSession::start(&store, "四级", QuizMode::EnglishToChinese, 51).is_err());
    }

    #[test]
    fn start_rejects_empty_category() {
        let err = QuizSession::start(&store(), "雅思", QuizMode::EnglishToChinese, 5)
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::EmptyCategory(_)));
    }

    #[test]
    fn session_completes_after_configured_count() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::EnglishToChinese, 3).unwrap();
        for n in 1..=3 {
            let q = expect_question(&mut session, &mut rng);
            assert_eq!(q.number, n);
            session.check_answer(&q, &q.correct_answer.clone());
        }
        assert!(matches!(session.next_question(&mut rng), Round::Complete));
        assert!(session.is_complete());
        // stays complete
        assert!(matches!(session.next_question(&mut rng), Round::Complete));
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn questions_only_draw_from_selected_category() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::ChineseToEnglish, 50).unwrap();
        while let Round::Question(q) = session.next_question(&mut rng) {
            assert_eq!(q.prompt_entry.category, "四级");
            assert!(!q.options.contains(&"academic".to_string()));
            assert_eq!(q.prompt(), q.prompt_entry.chinese);
            assert_eq!(q.correct_answer, q.prompt_entry.english);
        }
    }

    #[test]
    fn repeated_miss_is_recorded_once() {
        let store = VocabStore::from_entries(vec![
            WordEntry::new("abandon", "放弃", "四级"),
            WordEntry::new("ability", "能力", "四级"),
        ]);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut session = QuizSession::start(&store, "四级", QuizMode::EnglishToChinese, 20).unwrap();
        while let Round::Question(q) = session.next_question(&mut rng) {
            let wrong = wrong_option(&q);
            let outcome = session.check_answer(&q, &wrong);
            assert!(!outcome.correct);
            assert_eq!(outcome.correct_answer, q.correct_answer);
        }
        let misses = session.current_wrong_words();
        assert_eq!(misses.len(), 2);
        assert_ne!(misses[0].english, misses[1].english);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn end_computes_accuracy_and_saves_misses() {
        let dir = TempDir::new().unwrap();
        let ledger_path = dir.path().join("wrong_words.csv");
        let mut ledger = WrongWordLedger::load(&ledger_path).unwrap();

        let mut rng = SmallRng::seed_from_u64(3);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::EnglishToChinese, 4).unwrap();
        let mut i = 0;
        while let Round::Question(q) = session.next_question(&mut rng) {
            let pick = if i % 2 == 0 { q.correct_answer.clone() } else { wrong_option(&q) };
            session.check_answer(&q, &pick);
            i += 1;
        }

        let (summary, save_error) = session.end(&mut ledger);
        assert!(save_error.is_none());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.score, 2);
        assert!((summary.accuracy_percent - 50.0).abs() < 1e-9);
        assert!(!summary.misses.is_empty());
        assert_eq!(ledger.records().len(), summary.misses.len());
        assert!(ledger_path.exists());
    }

    #[test]
    fn ending_early_divides_by_configured_total() {
        let dir = TempDir::new().unwrap();
        let mut ledger = WrongWordLedger::load(&dir.path().join("w.csv")).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::EnglishToChinese, 10).unwrap();
        let q = expect_question(&mut session, &mut rng);
        session.check_answer(&q, &q.correct_answer.clone());

        let (summary, _) = session.end(&mut ledger);
        assert_eq!(summary.answered, 1);
        assert!((summary.accuracy_percent - 10.0).abs() < 1e-9);
        assert!(!dir.path().join("w.csv").exists());
    }

    #[test]
    fn single_entry_category_degrades_to_one_option() {
        let store = VocabStore::from_entries(vec![WordEntry::new("abandon", "放弃", "四级")]);
        let mut rng = SmallRng::seed_from_u64(0);
        let mut session = QuizSession::start(&store, "四级", QuizMode::EnglishToChinese, 1).unwrap();
        let q = expect_question(&mut session, &mut rng);
        assert_eq!(q.options, vec!["放弃".to_string()]);
        assert_eq!(q.correct_index(), Some(0));
        assert!(matches!(session.next_question(&mut rng), Round::Complete));
    }

    #[test]
    fn score_never_exceeds_total() {
        let mut rng = SmallRng::seed_from_u64(77);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::ChineseToEnglish, 7).unwrap();
        while let Round::Question(q) = session.next_question(&mut rng) {
            session.check_answer(&q, &q.correct_answer.clone());
        }
        assert!(session.score() <= session.total_questions());
        assert!((session.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mode_fields() {
        let entry = WordEntry::new("abandon", "放弃", "四级");
        assert_eq!(QuizMode::EnglishToChinese.prompt_of(&entry), "abandon");
        assert_eq!(QuizMode::EnglishToChinese.answer_of(&entry), "放弃");
        assert_eq!(QuizMode::ChineseToEnglish.prompt_of(&entry), "放弃");
        assert_eq!(QuizMode::EnglishToChinese.toggle(), QuizMode::ChineseToEnglish);
    }

    #[test]
    fn each_question_is_scored_once() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::EnglishToChinese, 1).unwrap();
        let q = expect_question(&mut session, &mut rng);

        assert!(session.check_answer(&q, &q.correct_answer.clone()).correct);
        let again = session.check_answer(&q, &q.correct_answer.clone());
        assert!(again.correct);
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered(), 1);

        assert!(matches!(session.next_question(&mut rng), Round::Complete));
        session.check_answer(&q, &q.correct_answer.clone());
        session.check_answer(&q, &wrong_option(&q));
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered(), 1);
        assert!(session.current_wrong_words().is_empty());
        assert!(session.score() <= session.total_questions());
    }

    #[test]
    fn stale_question_is_not_scored() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut session = QuizSession::start(&store(), "四级", QuizMode::EnglishToChinese, 3).unwrap();
        let first = expect_question(&mut session, &mut rng);
        let _second = expect_question(&mut session, &mut rng);

        session.check_answer(&first, &wrong_option(&first));
        assert_eq!(session.answered(), 0);
        assert!(session.current_wrong_words().is_empty());
    }
}
