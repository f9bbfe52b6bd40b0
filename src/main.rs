mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};

use cihui::config::Config;
use cihui::error::{MAX_QUESTIONS, MIN_QUESTIONS};
use cihui::session::quiz::QuizMode;
use cihui::speech;
use cihui::store::ledger::WrongWordLedger;
use cihui::store::schema::{CategoryFilter, WrongWordRecord};
use cihui::store::vocab::VocabStore;

use app::{App, AppScreen, SetupField, StatusKind};
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::review_table::ReviewTable;
use ui::components::setup_form::SetupForm;
use ui::layout::{AppLayout, QuizLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "cihui", version, about = "Terminal vocabulary quiz with a wrong-word book")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, help = "Vocabulary CSV (english,chinese,category)")]
    vocab: Option<PathBuf>,

    #[arg(long, help = "Wrong-word ledger CSV")]
    ledger: Option<PathBuf>,

    #[arg(short, long, help = "Category selected on start")]
    category: Option<String>,

    #[arg(short, long, value_enum, help = "Quiz direction")]
    mode: Option<ModeArg>,

    #[arg(
        short = 'n',
        long,
        value_parser = clap::value_parser!(u64).range(MIN_QUESTIONS as u64..=MAX_QUESTIONS as u64),
        help = "Questions per session (1-50)"
    )]
    count: Option<u64>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Do not pronounce English prompts")]
    no_speech: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the wrong-word book and exit
    Review {
        #[arg(short, long, help = "Only show this category")]
        category: Option<String>,

        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    #[value(name = "en-zh")]
    EnglishToChinese,
    #[value(name = "zh-en")]
    ChineseToEnglish,
}

impl From<ModeArg> for QuizMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::EnglishToChinese => QuizMode::EnglishToChinese,
            ModeArg::ChineseToEnglish => QuizMode::ChineseToEnglish,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!(
            "ignoring malformed config {}: {err:#}",
            Config::config_path().display()
        );
        Config::default()
    });
    apply_overrides(&mut config, &cli);

    let _log_guard = logging::init_tracing(&Config::log_dir(), &config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "cihui starting");

    if let Some(Command::Review { category, json }) = cli.command {
        return print_review(&config, category, json);
    }

    run_tui(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(path) = &cli.vocab {
        config.vocab_path = path.display().to_string();
    }
    if let Some(path) = &cli.ledger {
        config.ledger_path = path.display().to_string();
    }
    if let Some(category) = &cli.category {
        if !config.categories.is_empty() && !config.categories.contains(category) {
            config.categories.push(category.clone());
        }
        config.default_category = category.clone();
    }
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if let Some(count) = cli.count {
        config.question_count = count as usize;
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if cli.no_speech {
        config.speech.enabled = false;
    }
    config.normalize();
}

fn print_review(config: &Config, category: Option<String>, json: bool) -> Result<()> {
    let ledger = WrongWordLedger::load(&config.ledger_path())?;
    let filter = category.map_or(CategoryFilter::All, CategoryFilter::Only);
    print!("{}", format_review(&ledger.filter(&filter), json)?);
    Ok(())
}

/// Display width of `text`, counting CJK and other wide glyphs as two columns.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if (c as u32) >= 0x1100 { 2 } else { 1 })
        .sum()
}

fn pad_to(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

/// The `review` subcommand's output: pretty JSON, or an aligned table.
fn format_review(rows: &[&WrongWordRecord], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(rows)?));
    }
    if rows.is_empty() {
        return Ok("The wrong-word book is empty.\n".to_string());
    }

    let category_width = rows
        .iter()
        .map(|r| display_width(&r.category))
        .chain([display_width("Category")])
        .max()
        .unwrap_or(0);
    let word_width = rows
        .iter()
        .map(|r| display_width(&r.english))
        .chain([display_width("Word")])
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{}  {}  Meaning\n",
        pad_to("Category", category_width),
        pad_to("Word", word_width)
    );
    for row in rows {
        out.push_str(&format!(
            "{}  {}  {}\n",
            pad_to(&row.category, category_width),
            pad_to(&row.english, word_width),
            row.chinese
        ));
    }
    Ok(out)
}

fn run_tui(config: Config) -> Result<()> {
    let mut status_error = None;

    let store = VocabStore::load(&config.vocab_path()).unwrap_or_else(|err| {
        warn!(error = %err, "starting without vocabulary");
        status_error = Some(err.to_string());
        VocabStore::default()
    });
    let ledger_path = config.ledger_path();
    let ledger = WrongWordLedger::load(&ledger_path).unwrap_or_else(|err| {
        warn!(error = %err, "could not read wrong-word ledger");
        status_error = Some(err.to_string());
        WrongWordLedger::empty(&ledger_path)
    });

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let speaker = speech::from_config(&config.speech);

    let mut app = App::new(config, store, ledger, theme, speaker);
    if let Some(err) = status_error {
        app.set_error(err);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    info!("cihui exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;
        // the word is on screen before it is pronounced
        app.speak_pending();

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Setup => handle_setup_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
        AppScreen::Review => handle_review_key(app, key),
    }
}

fn handle_setup_key(app: &mut App, key: KeyEvent) {
    let on_count = app.setup.focused() == SetupField::Count;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('r') => app.open_review(),
        KeyCode::Enter => app.start_quiz(),
        KeyCode::Up | KeyCode::BackTab => app.setup_focus_prev(),
        KeyCode::Down | KeyCode::Tab => app.setup_focus_next(),
        KeyCode::Left => app.setup_cycle(false),
        KeyCode::Right => app.setup_cycle(true),
        KeyCode::Char(ch) if on_count => app.count_push_digit(ch),
        KeyCode::Backspace if on_count => app.count_backspace(),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.end_quiz();
        return;
    }

    let answered = app.quiz.as_ref().is_some_and(|q| q.outcome.is_some());
    if answered {
        app.advance();
        return;
    }

    match key.code {
        KeyCode::Char(ch) => {
            if let Some(n) = ch.to_digit(10)
                && n >= 1
            {
                app.answer(n as usize - 1);
            }
        }
        KeyCode::Up => app.quiz_select_prev(),
        KeyCode::Down => app.quiz_select_next(),
        KeyCode::Enter => app.answer_selected(),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc => app.go_to_setup(),
        KeyCode::Char('r') => app.open_review(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_review_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_setup(),
        KeyCode::Left => app.cycle_review_filter(false),
        KeyCode::Right => app.cycle_review_filter(true),
        KeyCode::Up => app.review_scroll_up(),
        KeyCode::Down => app.review_scroll_down(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::Setup => render_setup(frame, app, layout.main),
        AppScreen::Quiz => render_quiz(frame, app, layout.main),
        AppScreen::Result => render_result(frame, app, layout.main),
        AppScreen::Review => render_review(frame, app, layout.main),
    }

    render_footer(frame, app, &layout);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let info = match (&app.screen, &app.quiz) {
        (AppScreen::Quiz, Some(state)) => format!(
            " {} | {} | Question {}/{} | Score {}",
            state.session.category(),
            state.session.mode().label(),
            state.question.number,
            state.session.total_questions(),
            state.session.score(),
        ),
        _ => format!(
            " {} words | {} in wrong-word book",
            app.store.len(),
            app.ledger.records().len()
        ),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " cihui ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;

    let hints: &[&str] = match app.screen {
        AppScreen::Setup => &[
            "[↑/↓] Field",
            "[←/→] Change",
            "[Enter] Start",
            "[r] Review",
            "[q] Quit",
        ],
        AppScreen::Quiz => {
            if app.quiz.as_ref().is_some_and(|q| q.outcome.is_some()) {
                &["[any key] Next", "[Esc] End quiz"]
            } else {
                &["[1-4] Answer", "[↑/↓] Select", "[Enter] Confirm", "[Esc] End quiz"]
            }
        }
        AppScreen::Result => &["[Enter] New quiz", "[r] Review", "[q] Quit"],
        AppScreen::Review => &["[←/→] Category", "[↑/↓] Scroll", "[Esc] Back"],
    };

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Error => colors.error(),
        };
        let line = Paragraph::new(Span::styled(
            format!("  {}", status.text),
            Style::default().fg(color),
        ));
        frame.render_widget(line, layout.status);
    }

    let lines: Vec<Line> = pack_hint_lines(hints, layout.hints.width as usize)
        .into_iter()
        .map(|hint| Line::from(Span::styled(hint, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), layout.hints);
}

fn render_setup(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let form = SetupForm::new(&app.setup, app.theme);
    let form_area = centered_rect(50, 80, area);
    frame.render_widget(&form, form_area);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(state) = &app.quiz else {
        return;
    };

    let layout = QuizLayout::new(area);

    let progress = ProgressBar::new(
        "Progress",
        state.session.answered(),
        state.session.total_questions(),
        app.theme,
    );
    frame.render_widget(progress, layout.progress);

    let card = QuestionCard::new(
        &state.question,
        state.selected,
        state.outcome.as_ref(),
        app.theme,
    );
    frame.render_widget(card, layout.card);
}

fn render_result(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    if let Some(summary) = &app.last_summary {
        let dashboard = Dashboard::new(summary, app.last_save_error.as_deref(), app.theme);
        frame.render_widget(dashboard, centered_rect(60, 90, area));
    }
}

fn render_review(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let rows = app.review_rows();
    let table = ReviewTable::new(&rows, app.review_filter(), app.review_scroll, app.theme);
    frame.render_widget(table, centered_rect(80, 95, area));
}
