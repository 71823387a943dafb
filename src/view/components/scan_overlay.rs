//! src/view/components/scan_overlay.rs
//! ============================================================================
//! # ScanOverlay: Scanning Progress Modal
//!
//! Centered modal with an animated spinner, the scan target, and the live
//! byte counter fed by the scanner's progress channel.

use std::rc::Rc;
use std::sync::atomic::Ordering;

use crate::AppState;
use crate::view::{icons, projection, theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct ScanOverlay;

impl ScanOverlay {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let spinner = icons::SPINNER_FRAMES[app.spinner_frame % icons::SPINNER_FRAMES.len()];
        let scanned = app.scanned_bytes.load(Ordering::Relaxed);

        let lines: Vec<Line<'_>> = vec![
            Line::from(Span::styled(
                format!("{spinner} Scanning {}…", app.root_path.display()),
                Style::default()
                    .fg(theme::YELLOW)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("{} scanned", projection::human_size(scanned)),
                Style::default().fg(theme::TEAL),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "press q to quit",
                Style::default().fg(theme::GRAY),
            )),
        ];

        let overlay_area = Self::centered_rect(60, 30, area);
        frame.render_widget(Clear, overlay_area);

        let block = Block::default()
            .title("dusk")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::PURPLE));

        frame.render_widget(
            Paragraph::new(Text::from(lines))
                .block(block)
                .alignment(Alignment::Center),
            overlay_area,
        );
    }

    /// Standard centered modal rectangle.
    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical: Rc<[Rect]> = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        let horizontal: Rc<[Rect]> = Layout::default()
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
