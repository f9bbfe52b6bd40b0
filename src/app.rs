use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, warn};

use cihui::config::Config;
use cihui::error::MAX_QUESTIONS;
use cihui::session::quiz::{self, AnswerOutcome, Question, QuizMode, QuizSession, Round};
use cihui::session::result::SessionSummary;
use cihui::speech::Speaker;
use cihui::store::ledger::WrongWordLedger;
use cihui::store::schema::{CategoryFilter, WrongWordRecord};
use cihui::store::vocab::VocabStore;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Setup,
    Quiz,
    Result,
    Review,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupField {
    Category,
    Mode,
    Count,
}

impl SetupField {
    pub const ALL: [SetupField; 3] = [SetupField::Category, SetupField::Mode, SetupField::Count];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

pub struct SetupState {
    pub categories: Vec<String>,
    pub category_index: usize,
    pub mode: QuizMode,
    pub count_input: String,
    pub focus: usize,
}

impl SetupState {
    pub fn category(&self) -> Option<&str> {
        self.categories.get(self.category_index).map(|s| s.as_str())
    }

    pub fn focused(&self) -> SetupField {
        SetupField::ALL[self.focus]
    }
}

pub struct QuizState {
    pub session: QuizSession,
    pub question: Question,
    pub selected: usize,
    pub outcome: Option<AnswerOutcome>,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub store: VocabStore,
    pub ledger: WrongWordLedger,
    pub setup: SetupState,
    pub quiz: Option<QuizState>,
    pub last_summary: Option<SessionSummary>,
    pub last_save_error: Option<String>,
    pub review_filters: Vec<CategoryFilter>,
    pub review_filter_index: usize,
    pub review_scroll: usize,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    pending_speech: Option<String>,
    speaker: Box<dyn Speaker>,
    rng: SmallRng,
}

impl App {
    pub fn new(
        config: Config,
        store: VocabStore,
        ledger: WrongWordLedger,
        theme: &'static Theme,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        let categories = if config.categories.is_empty() {
            store.categories()
        } else {
            config.categories.clone()
        };
        let category_index = categories
            .iter()
            .position(|c| *c == config.default_category)
            .unwrap_or(0);

        let mut review_filters = vec![CategoryFilter::All];
        review_filters.extend(categories.iter().cloned().map(CategoryFilter::Only));

        let setup = SetupState {
            categories,
            category_index,
            mode: config.mode,
            count_input: config.question_count.to_string(),
            focus: 0,
        };

        Self {
            screen: AppScreen::Setup,
            config,
            theme,
            store,
            ledger,
            setup,
            quiz: None,
            last_summary: None,
            last_save_error: None,
            review_filters,
            review_filter_index: 0,
            review_scroll: 0,
            status: None,
            should_quit: false,
            pending_speech: None,
            speaker,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Info,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Error,
        });
    }

    // --- setup ---

    pub fn setup_focus_next(&mut self) {
        self.setup.focus = (self.setup.focus + 1) % SetupField::ALL.len();
    }

    pub fn setup_focus_prev(&mut self) {
        self.setup.focus = if self.setup.focus == 0 {
            SetupField::ALL.len() - 1
        } else {
            self.setup.focus - 1
        };
    }

    pub fn setup_cycle(&mut self, forward: bool) {
        match self.setup.focused() {
            SetupField::Category => {
                let len = self.setup.categories.len();
                if len > 0 {
                    self.setup.category_index = if forward {
                        (self.setup.category_index + 1) % len
                    } else {
                        (self.setup.category_index + len - 1) % len
                    };
                }
            }
            SetupField::Mode => self.setup.mode = self.setup.mode.toggle(),
            SetupField::Count => {
                let current = quiz::parse_question_count(&self.setup.count_input)
                    .unwrap_or(self.config.question_count);
                let next = if forward {
                    (current + 1).min(MAX_QUESTIONS)
                } else {
                    current.saturating_sub(1).max(1)
                };
                self.setup.count_input = next.to_string();
            }
        }
    }

    pub fn count_push_digit(&mut self, ch: char) {
        if ch.is_ascii_digit() && self.setup.count_input.len() < 3 {
            self.setup.count_input.push(ch);
        }
    }

    pub fn count_backspace(&mut self) {
        self.setup.count_input.pop();
    }

    /// Validate the setup form and open a session. Failures stay on the
    /// setup screen with the reason in the status line.
    pub fn start_quiz(&mut self) {
        let count = match quiz::parse_question_count(&self.setup.count_input) {
            Ok(count) => count,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };
        let Some(category) = self.setup.category().map(|c| c.to_string()) else {
            self.set_error("no categories configured");
            return;
        };

        let session = match QuizSession::start(&self.store, &category, self.setup.mode, count) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not start session");
                self.set_error(e.to_string());
                return;
            }
        };

        self.status = None;
        self.last_summary = None;
        self.last_save_error = None;
        self.begin_round(session);
    }

    fn begin_round(&mut self, mut session: QuizSession) {
        match session.next_question(&mut self.rng) {
            Round::Question(question) => {
                if question.mode == QuizMode::EnglishToChinese {
                    self.pending_speech = Some(question.prompt_entry.english.clone());
                }
                self.quiz = Some(QuizState {
                    session,
                    question,
                    selected: 0,
                    outcome: None,
                });
                self.screen = AppScreen::Quiz;
            }
            Round::Complete => self.finish_session(session),
        }
    }

    // --- quiz ---

    pub fn quiz_select_next(&mut self) {
        if let Some(state) = self.quiz.as_mut()
            && state.outcome.is_none()
            && !state.question.options.is_empty()
        {
            state.selected = (state.selected + 1) % state.question.options.len();
        }
    }

    pub fn quiz_select_prev(&mut self) {
        if let Some(state) = self.quiz.as_mut()
            && state.outcome.is_none()
            && !state.question.options.is_empty()
        {
            let len = state.question.options.len();
            state.selected = (state.selected + len - 1) % len;
        }
    }

    /// Answer with the option at `index`. Ignored once the current question
    /// has been answered or when the index is out of range.
    pub fn answer(&mut self, index: usize) {
        let Some(state) = self.quiz.as_mut() else {
            return;
        };
        if state.outcome.is_some() {
            return;
        }
        let Some(choice) = state.question.options.get(index).cloned() else {
            return;
        };
        state.selected = index;
        let outcome = state.session.check_answer(&state.question, &choice);
        state.outcome = Some(outcome);
    }

    pub fn answer_selected(&mut self) {
        if let Some(selected) = self.quiz.as_ref().map(|s| s.selected) {
            self.answer(selected);
        }
    }

    /// Move on after the feedback for an answered question.
    pub fn advance(&mut self) {
        let answered = self.quiz.as_ref().is_some_and(|s| s.outcome.is_some());
        if !answered {
            return;
        }
        if let Some(state) = self.quiz.take() {
            self.begin_round(state.session);
        }
    }

    /// End the running session now, answered or not.
    pub fn end_quiz(&mut self) {
        if let Some(state) = self.quiz.take() {
            self.finish_session(state.session);
        }
    }

    fn finish_session(&mut self, session: QuizSession) {
        let (summary, save_error) = session.end(&mut self.ledger);
        self.last_save_error = save_error.map(|e| {
            error!(error = %e, "failed to save wrong-word ledger");
            e.to_string()
        });
        self.last_summary = Some(summary);
        self.pending_speech = None;
        self.screen = AppScreen::Result;
    }

    // --- speech ---

    pub fn speak_pending(&mut self) {
        if let Some(word) = self.pending_speech.take() {
            // failures are logged by the speaker and switch it off
            let _ = self.speaker.speak(&word);
        }
    }

    // --- review ---

    pub fn open_review(&mut self) {
        if self.ledger.is_empty() {
            self.set_info("The wrong-word book is empty. Keep it up!");
            self.screen = AppScreen::Setup;
            return;
        }
        self.review_filter_index = 0;
        self.review_scroll = 0;
        self.screen = AppScreen::Review;
    }

    pub fn review_filter(&self) -> &CategoryFilter {
        &self.review_filters[self.review_filter_index]
    }

    pub fn review_rows(&self) -> Vec<&WrongWordRecord> {
        self.ledger.filter(self.review_filter())
    }

    pub fn cycle_review_filter(&mut self, forward: bool) {
        let len = self.review_filters.len();
        self.review_filter_index = if forward {
            (self.review_filter_index + 1) % len
        } else {
            (self.review_filter_index + len - 1) % len
        };
        self.review_scroll = 0;
    }

    pub fn review_scroll_down(&mut self) {
        let rows = self.review_rows().len();
        if self.review_scroll + 1 < rows {
            self.review_scroll += 1;
        }
    }

    pub fn review_scroll_up(&mut self) {
        self.review_scroll = self.review_scroll.saturating_sub(1);
    }

    pub fn go_to_setup(&mut self) {
        self.screen = AppScreen::Setup;
    }

    #[cfg(test)]
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}
