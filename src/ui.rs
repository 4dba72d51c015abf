//! Console output helpers
//!
//! Bold status messages and the color palette used to tag concurrent
//! command output.

use colored::{Color, Colorize};

/// Palette cycled through in launch order; each concurrent command keeps
/// the color it was assigned for its whole lifetime.
pub const COLORS: [Color; 12] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::BrightCyan,
    Color::BrightYellow,
    Color::BrightGreen,
    Color::BrightMagenta,
    Color::BrightRed,
    Color::BrightBlue,
];

/// Print a bold status message
pub fn print_message(message: &str) {
    println!("{}", message.bold());
}

/// Color assigned to the command launched at `index`
pub fn color_for(index: usize) -> Color {
    COLORS[index % COLORS.len()]
}
