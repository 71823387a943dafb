//! src/view/components/confirm_overlay.rs
//! ============================================================================
//! # ConfirmOverlay: Move-to-Trash Prompt

use crate::AppState;
use crate::view::{projection, theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct ConfirmOverlay;

impl ConfirmOverlay {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let Some(confirm) = &app.confirm else {
            return;
        };

        let overlay_area = Self::centered_rect(60, 20, area);
        frame.render_widget(Clear, overlay_area);

        // Name budget: the overlay is narrow, keep the prompt on one line.
        let name_budget = usize::from(overlay_area.width.saturating_sub(24).max(8));

        let lines = vec![
            Line::from(Span::styled(
                format!(
                    "⚠  Move to Trash: {} ?",
                    projection::truncate(&confirm.name, name_budget)
                ),
                Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "d/y/enter",
                    Style::default().fg(theme::GREEN).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" yes    ", Style::default().fg(theme::GRAY)),
                Span::styled(
                    "esc/n",
                    Style::default().fg(theme::PURPLE).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" no", Style::default().fg(theme::GRAY)),
            ]),
        ];

        let block = Block::default()
            .title("Confirm")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::RED));

        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(block)
                .alignment(Alignment::Center),
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
