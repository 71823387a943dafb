//! src/view/components/browse_table.rs
//! ============================================================================
//! # BrowseTable: Directory Listing With Proportional Bars
//!
//! Renders the current directory's children inside a bordered block whose
//! title is the breadcrumb. Row content (window, truncation, bar widths,
//! color buckets) comes entirely from the projection module; this file only
//! applies styles.

use crate::model::app_state::AppState;
use crate::view::projection::{self, Row, RowKind};
use crate::view::{icons, theme};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct BrowseTable;

impl BrowseTable {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", breadcrumb(app)))
            .title_style(Style::default().fg(theme::TEAL).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(theme::COMMENT));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let children = app.visible_children();
        let total_size = app.current_dir().map_or(0, |d| d.size());

        // Bar width: a quarter of the screen, capped by config.
        let bar_max: u16 = (inner.width / 4).clamp(4, app.config.bar_max_width.max(4));
        // Name width: what's left after icon, bar, size and percent columns.
        let name_width = usize::from(inner.width.saturating_sub(bar_max + 20).max(10));

        let height = usize::from(inner.height);
        let window = projection::scroll_window(app.cursor, children.len(), height);
        let rows = projection::project_rows(
            &children,
            window,
            app.cursor,
            total_size,
            name_width,
            bar_max,
        );

        let lines: Vec<Line<'_>> = rows
            .iter()
            .map(|row| render_row(row, bar_max, name_width))
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// One row: `████░░░░ ▸ name          1.2 MB  42%`
fn render_row(row: &Row, bar_max: u16, name_width: usize) -> Line<'static> {
    let fill = usize::from(row.bar);
    let track = usize::from(bar_max) - fill;

    let bar_color = theme::BAR_BUCKETS[row.bucket.min(theme::BAR_BUCKETS.len() - 1)];
    let (icon, name_style) = match row.kind {
        RowKind::Dir => (
            icons::FOLDER_ICON,
            Style::default().fg(theme::PURPLE).add_modifier(Modifier::BOLD),
        ),
        RowKind::File => (icons::FILE_ICON, Style::default().fg(theme::FOREGROUND)),
        RowKind::Errored => (icons::ERROR_ICON, Style::default().fg(theme::RED)),
    };

    let padded_name = format!("{:<width$}", row.name, width = name_width);

    let mut spans = vec![
        Span::styled(icons::BAR_FULL.repeat(fill), Style::default().fg(bar_color)),
        Span::styled(icons::BAR_EMPTY.repeat(track), Style::default().fg(theme::COMMENT)),
        Span::raw(" "),
        Span::styled(format!("{icon} "), name_style),
        Span::styled(padded_name, name_style),
        Span::styled(
            format!("{:>10}", projection::human_size(row.size)),
            Style::default().fg(theme::TEAL),
        ),
        Span::styled(
            format!("{:>5.0}%", row.ratio * 100.0),
            Style::default().fg(theme::GRAY),
        ),
    ];

    if row.selected {
        for span in &mut spans {
            span.style = span
                .style
                .bg(theme::CURRENT_LINE)
                .add_modifier(Modifier::BOLD);
        }
    }

    Line::from(spans)
}

/// `path › dir › subdir` for the block title.
fn breadcrumb(app: &AppState) -> String {
    let mut out = app.root_path.display().to_string();
    for node in &app.stack {
        out.push_str(" › ");
        out.push_str(&node.name);
    }
    out
}
