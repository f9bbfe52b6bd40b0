use ratatui::layout::{Constraint, Direction, Layout, Rect};

const MIN_PANEL_WIDTH: u16 = 48;
const MIN_PANEL_HEIGHT: u16 = 14;

/// Header bar, screen body, a status line, and two rows of key hints.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub status: Rect,
    pub hints: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: rows[0],
            main: rows[1],
            status: rows[2],
            hints: rows[3],
        }
    }
}

/// Quiz body: a gauge above the question card.
pub struct QuizLayout {
    pub progress: Rect,
    pub card: Rect,
}

impl QuizLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(6)])
            .split(centered_rect(70, 90, area));

        Self {
            progress: rows[0],
            card: rows[1],
        }
    }
}

/// Greedily fit `hints` onto as few lines as `width` allows. Each line is
/// indented by two spaces and hints are separated by two spaces.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    const GAP: &str = "  ";

    let mut lines: Vec<String> = Vec::new();
    if width == 0 {
        return lines;
    }

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let fits = lines
            .last()
            .is_some_and(|line| line.chars().count() + GAP.len() + hint.chars().count() <= width);
        if fits && let Some(line) = lines.last_mut() {
            line.push_str(GAP);
            line.push_str(hint);
        } else {
            lines.push(format!("{GAP}{hint}"));
        }
    }
    lines
}

/// A panel centered in `area`, sized by percentage but never smaller than
/// a readable minimum and never larger than `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, percent: u16, min: u16| {
        let wanted = (u32::from(len) * u32::from(percent.min(100)) / 100) as u16;
        wanted.max(min).min(len)
    };
    let width = scale(area.width, percent_x, MIN_PANEL_WIDTH);
    let height = scale(area.height, percent_y, MIN_PANEL_HEIGHT);

    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[1-4] Answer", "[Enter] Confirm", "[Esc] End"], 20);
        assert_eq!(lines, vec!["  [1-4] Answer", "  [Enter] Confirm", "  [Esc] End"]);

        let lines = pack_hint_lines(&["[1-4] Answer", "", "[Esc] End"], 80);
        assert_eq!(lines, vec!["  [1-4] Answer  [Esc] End"]);

        assert!(pack_hint_lines(&["[q] Quit"], 0).is_empty());
    }

    #[test]
    fn centered_rect_never_exceeds_area() {
        let area = Rect::new(0, 0, 30, 10);
        assert_eq!(centered_rect(50, 50, area), area);

        let area = Rect::new(0, 0, 200, 60);
        assert_eq!(centered_rect(50, 50, area), Rect::new(50, 15, 100, 30));
    }

    #[test]
    fn app_layout_reserves_footer_rows() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.main.height, 20);
        assert_eq!(layout.status.y, 21);
        assert_eq!(layout.hints.y, 22);
        assert_eq!(layout.hints.height, 2);
    }

    #[test]
    fn setup_hints_fit_footer_on_narrow_terminal() {
        let layout = AppLayout::new(Rect::new(0, 0, 48, 24));
        let hints = ["[↑/↓] Field", "[←/→] Change", "[Enter] Start", "[r] Review", "[q] Quit"];
        let lines = pack_hint_lines(&hints, layout.hints.width as usize);
        assert_eq!(lines.len(), 2);
        assert!(lines.len() <= layout.hints.height as usize);
        assert_eq!(lines[1], "  [r] Review  [q] Quit");
        assert!(lines.iter().all(|l| l.chars().count() <= 48));
    }
}
