use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use cihui::session::result::SessionSummary;
use cihui::store::schema::WordEntry;

use crate::ui::theme::Theme;

pub struct Dashboard<'a> {
    pub summary: &'a SessionSummary,
    pub save_error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(summary: &'a SessionSummary, save_error: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            summary,
            save_error,
            theme,
        }
    }
}

/// `1. abandon → 放弃` style lines for the missed words.
pub fn miss_lines(misses: &[WordEntry]) -> Vec<String> {
    misses
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}. {} → {}", i + 1, w.english, w.chinese))
        .collect()
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = self.summary;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "Results",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}, {})", summary.category, summary.mode.label()),
                Style::default().fg(colors.muted()),
            ),
        ]))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let count_line = Line::from(vec![
            Span::styled("  Correct:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}/{}", summary.score, summary.total),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} answered)", summary.answered),
                Style::default().fg(colors.muted()),
            ),
        ]);
        Paragraph::new(count_line).render(layout[1], buf);

        let acc_color = if summary.accuracy_percent >= 90.0 {
            colors.success()
        } else if summary.accuracy_percent >= 60.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.2}%", summary.accuracy_percent),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let mut body: Vec<Line> = Vec::new();
        if summary.is_perfect() {
            body.push(Line::from(Span::styled(
                "  No mistakes this round. Well done!",
                Style::default().fg(colors.success()),
            )));
        } else {
            body.push(Line::from(Span::styled(
                "  Missed words:",
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )));
            for line in miss_lines(&summary.misses) {
                body.push(Line::from(Span::styled(
                    format!("    {line}"),
                    Style::default().fg(colors.error()),
                )));
            }
        }
        if let Some(err) = self.save_error {
            body.push(Line::from(""));
            body.push(Line::from(Span::styled(
                format!("  Could not save wrong-word book: {err}"),
                Style::default().fg(colors.warning()),
            )));
        }
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .render(layout[4], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [Enter] New quiz  ", Style::default().fg(colors.accent())),
            Span::styled("[r] Review  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[5], buf);
    }
}
