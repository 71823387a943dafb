//! src/view/theme.rs
//! ============================================================================
//! # Theme: Shared Color Palette

use ratatui::style::Color;

pub const BACKGROUND: Color = Color::Rgb(0x0f, 0x0f, 0x1a);
pub const CURRENT_LINE: Color = Color::Rgb(0x2a, 0x1a, 0x4a);
pub const FOREGROUND: Color = Color::Rgb(0xe8, 0xe8, 0xf0);
pub const COMMENT: Color = Color::Rgb(0x44, 0x44, 0x66);
pub const GRAY: Color = Color::Rgb(0x88, 0x88, 0x99);
pub const PURPLE: Color = Color::Rgb(0x9b, 0x59, 0xb6);
pub const TEAL: Color = Color::Rgb(0x1a, 0xbc, 0x9c);
pub const RED: Color = Color::Rgb(0xe7, 0x4c, 0x3c);
pub const ORANGE: Color = Color::Rgb(0xe6, 0x7e, 0x22);
pub const YELLOW: Color = Color::Rgb(0xf1, 0xc4, 0x0f);
pub const GREEN: Color = Color::Rgb(0x2e, 0xcc, 0x71);

/// Bar colors by size rank, largest first. Indexed by the projection's
/// color bucket.
pub const BAR_BUCKETS: [Color; 6] = [RED, ORANGE, YELLOW, TEAL, GREEN, COMMENT];
