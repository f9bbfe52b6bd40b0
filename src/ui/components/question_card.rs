use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use cihui::session::quiz::{AnswerOutcome, Question};

use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    pub question: &'a Question,
    pub selected: usize,
    pub outcome: Option<&'a AnswerOutcome>,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        question: &'a Question,
        selected: usize,
        outcome: Option<&'a AnswerOutcome>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            question,
            selected,
            outcome,
            theme,
        }
    }
}

/// Feedback text shown under the options once an answer is in.
pub fn feedback_text(outcome: &AnswerOutcome) -> String {
    if outcome.correct {
        "Correct!".to_string()
    } else {
        format!("Wrong, the answer is {}", outcome.correct_answer)
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Question {} ", self.question.number))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let option_rows = self.question.options.len().max(1) as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(option_rows + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let prompt = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.question.prompt(),
                Style::default()
                    .fg(colors.highlight())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center);
        prompt.render(layout[0], buf);

        let correct_index = self.question.correct_index();
        let mut lines = Vec::with_capacity(self.question.options.len());
        for (i, option) in self.question.options.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let style = match self.outcome {
                Some(_) if Some(i) == correct_index => Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
                Some(outcome) if is_selected && !outcome.correct => Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::CROSSED_OUT),
                Some(_) => Style::default().fg(colors.muted()),
                None if is_selected => Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
                None => Style::default().fg(colors.fg()),
            };
            lines.push(Line::from(Span::styled(
                format!("  {indicator} {}. {option}", i + 1),
                style,
            )));
        }
        Paragraph::new(lines).render(layout[1], buf);

        if let Some(outcome) = self.outcome {
            let color = if outcome.correct {
                colors.success()
            } else {
                colors.error()
            };
            Paragraph::new(Line::from(Span::styled(
                format!("  {}", feedback_text(outcome)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .wrap(Wrap { trim: false })
            .render(layout[2], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_names_the_right_answer() {
        let wrong = AnswerOutcome {
            correct: false,
            correct_answer: "放弃".to_string(),
        };
        assert_eq!(feedback_text(&wrong), "Wrong, the answer is 放弃");
        let right = AnswerOutcome {
            correct: true,
            correct_answer: "放弃".to_string(),
        };
        assert_eq!(feedback_text(&right), "Correct!");
    }
}
