//! src/view/components/error_overlay.rs
//! ============================================================================
//! # ErrorOverlay: Unrecoverable Error Screen
//!
//! Shown in the Error phase. Navigation is disabled; only quit is accepted.

use crate::AppState;
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub struct ErrorOverlay;

impl ErrorOverlay {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let message = app
            .last_error
            .as_deref()
            .unwrap_or("unknown error");

        let lines = vec![
            Line::from(Span::styled(
                format!("✗ {message}"),
                Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "press q to quit",
                Style::default().fg(theme::GRAY),
            )),
        ];

        let overlay_area = Self::centered_rect(70, 30, area);
        frame.render_widget(Clear, overlay_area);

        let block = Block::default()
            .title("dusk — Error")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::RED));

        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            overlay_area,
        );
    }

    /// Standard centered modal rectangle.
    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);

        horizontal[1]
    }
}
