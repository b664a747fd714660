//! Mapping of semantic roles to terminal styling.
//!
//! The reconstructor only decides which positions are highlighted and why;
//! this adapter turns `(byte, Role)` cells into ANSI text. Swapping it out
//! (e.g. for HTML) leaves the core untouched.

use crate::utils::ansi;

use super::reconstruct::{Cell, Role};

fn is_highlighted(role: Role) -> bool {
    matches!(
        role,
        Role::Mismatch | Role::Gap | Role::MatchOfInterest | Role::Padding
    )
}

fn style_cell(cell: &Cell, out: &mut String) {
    let ch = cell.ch as char;
    if cell.role == Role::LowQuality {
        out.push_str(ansi::FG_CYAN);
        out.push(ch);
        out.push_str(ansi::RESET);
        return;
    }
    match cell.ch {
        b'A' | b'a' | b'T' | b't' | b'G' | b'g' | b'C' | b'c' => {
            if is_highlighted(cell.role) {
                // base_background always knows these four letters
                if let Some(bg) = ansi::base_background(cell.ch) {
                    out.push_str(bg);
                    out.push(ch);
                    out.push_str(ansi::RESET);
                    return;
                }
            }
            out.push(ch);
        }
        b'-' if is_highlighted(cell.role) => {
            out.push_str(ansi::BG_BLACK);
            out.push(ch);
            out.push_str(ansi::RESET);
        }
        b'*' if is_highlighted(cell.role) => {
            out.push_str(ansi::BG_MAGENTA);
            out.push(ch);
            out.push_str(ansi::RESET);
        }
        b'N' | b'n' | b'.' => {
            // Placeholders render dim whether highlighted or not.
            out.push_str(ansi::DIM);
            out.push(ch);
            out.push_str(ansi::RESET);
        }
        _ => out.push(ch),
    }
}

/// Render one track. With `color` off this is just the raw characters.
pub fn render_track(track: &[Cell], color: bool) -> String {
    if !color {
        return track.iter().map(|c| c.ch as char).collect();
    }
    let mut out = String::with_capacity(track.len() * 4);
    for cell in track {
        style_cell(cell, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_mode_is_raw_text() {
        let track = vec![
            Cell { ch: b'A', role: Role::Mismatch },
            Cell { ch: b'-', role: Role::Gap },
        ];
        assert_eq!(render_track(&track, false), "A-");
    }

    #[test]
    fn test_highlighted_base_gets_background() {
        let track = vec![Cell { ch: b'A', role: Role::Mismatch }];
        assert_eq!(
            render_track(&track, true),
            format!("{}A{}", ansi::BG_RED, ansi::RESET)
        );
    }

    #[test]
    fn test_plain_match_not_styled() {
        let track = vec![Cell { ch: b'G', role: Role::Plain }];
        assert_eq!(render_track(&track, true), "G");
    }

    #[test]
    fn test_low_quality_precedence() {
        let track = vec![Cell { ch: b'T', role: Role::LowQuality }];
        assert_eq!(
            render_track(&track, true),
            format!("{}T{}", ansi::FG_CYAN, ansi::RESET)
        );
    }

    #[test]
    fn test_placeholders_render_dim() {
        let track = vec![
            Cell { ch: b'N', role: Role::Plain },
            Cell { ch: b'.', role: Role::Plain },
        ];
        assert_eq!(
            render_track(&track, true),
            format!("{d}N{r}{d}.{r}", d = ansi::DIM, r = ansi::RESET)
        );
    }

    #[test]
    fn test_padding_magenta() {
        let track = vec![Cell { ch: b'*', role: Role::Padding }];
        assert_eq!(
            render_track(&track, true),
            format!("{}*{}", ansi::BG_MAGENTA, ansi::RESET)
        );
    }
}
