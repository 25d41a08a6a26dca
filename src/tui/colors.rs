//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Each mode brands the status bar so the current mode is obvious at a glance.
// Native Color::Blue is used for navigation.

/// Used while adding a task
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used while editing a task
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for the completion banner
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
