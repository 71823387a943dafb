//! src/view/ui.rs
//! ============================================================================
//! # View: TUI Render Orchestrator
//!
//! Each draw cycle renders the phase's screen: the scanning progress modal,
//! the browse table + status bar, the delete-confirm overlay, or the error
//! screen. Rendering is a pure function of `AppState`; no state mutation
//! happens here.

use crate::AppState;
use crate::model::app_state::Phase;
use crate::view::components::{
    browse_table::BrowseTable, confirm_overlay::ConfirmOverlay, error_overlay::ErrorOverlay,
    scan_overlay::ScanOverlay, status_bar::StatusBar,
};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

pub struct View;

impl View {
    /// Draws the full UI for one frame.
    pub fn redraw(frame: &mut Frame<'_>, app: &AppState) {
        match app.phase {
            Phase::Scanning => ScanOverlay::render(frame, app, frame.area()),

            Phase::Error => ErrorOverlay::render(frame, app, frame.area()),

            Phase::Browsing | Phase::ConfirmDelete => {
                let main_layout = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Fill(1),   // Browse table
                        Constraint::Length(2), // Status bar + key hints
                    ])
                    .split(frame.area());

                BrowseTable::render(frame, app, main_layout[0]);
                StatusBar::render(frame, app, main_layout[1]);

                // The confirm prompt floats above the browse screen.
                if app.phase == Phase::ConfirmDelete {
                    ConfirmOverlay::render(frame, app, frame.area());
                }
            }
        }
    }
}
