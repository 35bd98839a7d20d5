//! Colored echo of raw frames for debug builds.
//!
//! Sent frames are printed green, received frames bright red, on stdout
//! next to the log output, so a developer running the host from a terminal
//! sees the full conversation.

use colored::Colorize;

/// Direction of an echoed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Formats one frame with its direction label and color.
pub fn format_frame(direction: Direction, frame: &str) -> String {
    match direction {
        Direction::Sent => format!("Sent: {frame}").green().to_string(),
        Direction::Received => format!("Received: {frame}").bright_red().to_string(),
    }
}

/// Prints `frame` when `enabled`.
pub fn echo_frame(enabled: bool, direction: Direction, frame: &str) {
    if enabled {
        println!("{}", format_frame(direction, frame));
    }
}
