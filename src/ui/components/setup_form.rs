use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::{SetupField, SetupState};
use crate::ui::theme::Theme;

/// Start screen: category, direction and question count, one row each.
pub struct SetupForm<'a> {
    pub state: &'a SetupState,
    pub theme: &'a Theme,
}

impl<'a> SetupForm<'a> {
    pub fn new(state: &'a SetupState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn value_of(&self, field: SetupField) -> String {
        match field {
            SetupField::Category => self
                .state
                .category()
                .unwrap_or("(no categories)")
                .to_string(),
            SetupField::Mode => self.state.mode.label().to_string(),
            SetupField::Count => format!("{}_", self.state.count_input),
        }
    }
}

fn field_label(field: SetupField) -> &'static str {
    match field {
        SetupField::Category => "Category",
        SetupField::Mode => "Direction",
        SetupField::Count => "Questions",
    }
}

fn field_hint(field: SetupField) -> &'static str {
    match field {
        SetupField::Category => "←/→ to switch word list",
        SetupField::Mode => "←/→ to flip prompt and answer",
        SetupField::Count => "type 1-50, or ←/→ to step",
    }
}

impl Widget for &SetupForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "cihui",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Vocabulary Quiz",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                SetupField::ALL
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, field) in SetupField::ALL.iter().enumerate() {
            let focused = self.state.focused() == *field;
            let indicator = if focused { ">" } else { " " };
            let label_style = if focused {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!(" {indicator} {:<10}", field_label(*field)),
                        label_style,
                    ),
                    Span::styled(
                        self.value_of(*field),
                        Style::default().fg(colors.highlight()),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("     {}", field_hint(*field)),
                    Style::default().fg(colors.muted()),
                )),
            ];

            if i < rows.len() {
                Paragraph::new(lines).render(rows[i], buf);
            }
        }
    }
}
