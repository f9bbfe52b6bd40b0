use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Row, Table, Widget};

use cihui::store::schema::{CategoryFilter, WrongWordRecord};

use crate::ui::theme::Theme;

/// The wrong-word book, one row per record, starting at `scroll`.
pub struct ReviewTable<'a> {
    pub rows: &'a [&'a WrongWordRecord],
    pub filter: &'a CategoryFilter,
    pub scroll: usize,
    pub theme: &'a Theme,
}

impl<'a> ReviewTable<'a> {
    pub fn new(
        rows: &'a [&'a WrongWordRecord],
        filter: &'a CategoryFilter,
        scroll: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            filter,
            scroll,
            theme,
        }
    }
}

impl Widget for ReviewTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = Line::from(vec![
            Span::raw(" Wrong-word book "),
            Span::styled(
                format!("< {} > ", self.filter.label()),
                Style::default().fg(colors.highlight()),
            ),
            Span::styled(
                format!("{} words ", self.rows.len()),
                Style::default().fg(colors.muted()),
            ),
        ]);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));

        let header = Row::new(["Category", "Word", "Meaning"]).style(
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        );

        let body: Vec<Row> = self
            .rows
            .iter()
            .skip(self.scroll)
            .map(|r| {
                Row::new([r.category.clone(), r.english.clone(), r.chinese.clone()])
                    .style(Style::default().fg(colors.fg()))
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Percentage(40),
            Constraint::Min(10),
        ];
        Table::new(body, widths)
            .header(header)
            .block(block)
            .column_spacing(2)
            .render(area, buf);
    }
}
