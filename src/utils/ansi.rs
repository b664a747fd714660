//! Terminal escape codes and small styling helpers.
//!
//! Styling is plain SGR escapes; every helper degrades to the bare text
//! when coloring is off so output stays pipe-friendly.

use std::io::IsTerminal;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const ITALIC: &str = "\x1b[3m";

pub const FG_RED: &str = "\x1b[31m";
pub const FG_GREEN: &str = "\x1b[32m";
pub const FG_YELLOW: &str = "\x1b[33m";
pub const FG_BLUE: &str = "\x1b[34m";
pub const FG_MAGENTA: &str = "\x1b[35m";
pub const FG_CYAN: &str = "\x1b[36m";

pub const BG_BLACK: &str = "\x1b[40m";
pub const BG_RED: &str = "\x1b[41m";
pub const BG_GREEN: &str = "\x1b[42m";
pub const BG_YELLOW: &str = "\x1b[43m";
pub const BG_BLUE: &str = "\x1b[44m";
pub const BG_MAGENTA: &str = "\x1b[45m";

/// Color when stdout is a terminal and NO_COLOR is unset.
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn paint(text: &str, style: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", style, text, RESET)
    } else {
        text.to_string()
    }
}

/// Background color used for a nucleotide, shared by the pairwise and
/// FASTQ renderers (A red, T green, G yellow, C blue).
pub fn base_background(base: u8) -> Option<&'static str> {
    match base {
        b'A' | b'a' => Some(BG_RED),
        b'T' | b't' => Some(BG_GREEN),
        b'G' | b'g' => Some(BG_YELLOW),
        b'C' | b'c' => Some(BG_BLUE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_plain_passthrough() {
        assert_eq!(paint("x", FG_RED, false), "x");
        assert_eq!(paint("x", FG_RED, true), "\x1b[31mx\x1b[0m");
    }

    #[test]
    fn test_base_background() {
        assert_eq!(base_background(b'A'), Some(BG_RED));
        assert_eq!(base_background(b'c'), Some(BG_BLUE));
        assert_eq!(base_background(b'N'), None);
    }
}
