//! src/view/components/status_bar.rs
//! ============================================================================
//! # StatusBar: Item Count, Totals, Sort Mode, Scroll Position, Key Hints
//!
//! Two lines at the bottom of the browse screen: live totals on the first,
//! the static key-hint footer on the second.

use crate::AppState;
use crate::view::{projection, theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        Self::render_status(frame, app, rows[0]);
        Self::render_hints(frame, rows[1]);
    }

    fn render_status(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let total = app.visible_len();
        let dir_size = app.current_dir().map_or(0, |d| d.size());

        let mut left = format!(
            " {} items  total: {}  sort: {}",
            total,
            projection::human_size(dir_size),
            app.sort.label(),
        );
        if let Some(purgeable) = app.purgeable {
            if purgeable > 0 {
                left.push_str(&format!("  purgeable: {}", projection::human_size(purgeable)));
            }
        }

        let position = if total == 0 {
            "0/0".to_owned()
        } else {
            format!("{}/{}", app.cursor + 1, total)
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(14)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                left,
                Style::default().fg(theme::GRAY),
            ))),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{position} "),
                Style::default().fg(theme::PURPLE),
            )))
            .alignment(Alignment::Right),
            chunks[1],
        );
    }

    fn render_hints(frame: &mut Frame<'_>, area: Rect) {
        let k = |key: &'static str, desc: &'static str| {
            [
                Span::styled(
                    key,
                    Style::default().fg(theme::PURPLE).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {desc}  "), Style::default().fg(theme::GRAY)),
            ]
        };

        let mut spans = vec![Span::raw(" ")];
        for pair in [
            k("↑↓/jk", "move"),
            k("→/enter", "enter"),
            k("←/bsp", "back"),
            k("o", "open"),
            k("r", "reveal"),
            k("d", "delete"),
            k("s", "sort"),
            k("q", "quit"),
        ] {
            spans.extend(pair);
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
