//! src/view/icons.rs
//! ============================================================================
//! # Icons: Row Indicator Glyphs

pub const FOLDER_ICON: &str = "▸";
pub const FILE_ICON: &str = "·";
pub const ERROR_ICON: &str = "✗";

/// Bar fill and track characters.
pub const BAR_FULL: &str = "█";
pub const BAR_EMPTY: &str = "░";

/// Animated spinner shown while scanning.
pub const SPINNER_FRAMES: [&str; 9] = ["⠁", "⠃", "⠇", "⠧", "⠷", "⠿", "⠻", "⠹", "⠸"];
