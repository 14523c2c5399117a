//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::io;

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Format a score in `[0, 1]` with color based on threshold. NaN is dimmed.
pub fn score_colored(value: f64) -> String {
    if value.is_nan() {
        return color("90", "  nan");
    }
    let code = if value >= 0.9 {
        "1;32"
    } else if value >= 0.7 {
        "1;33"
    } else if value >= 0.5 {
        "33"
    } else {
        "1;31"
    };
    color(code, &format!("{:.3}", value))
}
