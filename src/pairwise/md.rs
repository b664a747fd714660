//! MD:Z: tag decoding.
//!
//! The MD encoding interleaves three token kinds with no separators: match
//! run counts (`12`), single mismatch bases (`A`) and `^`-prefixed deletion
//! runs (`^ACG`). Because a number can butt directly against a deletion
//! marker or a mismatch base, the decoder is an explicit automaton that
//! flushes the pending token on every state transition; splitting with a
//! regex mishandles exactly those boundaries.

use std::fmt;

use super::AlignError;

/// One decoded MD token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdEntry {
    /// `n` query bases equal to the reference. A count of zero is legal and
    /// stands for "no bases between two adjacent events".
    MatchRun(usize),
    /// Exactly one reference base differing from the query. Runs of bare
    /// letters outside a deletion are invalid, so a mismatch can never
    /// carry more than one base.
    Mismatch(u8),
    /// Reference bases deleted from the query (after `^`).
    Deletion(Vec<u8>),
}

impl fmt::Display for MdEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdEntry::MatchRun(n) => write!(f, "{}", n),
            MdEntry::Mismatch(b) => write!(f, "{}", *b as char),
            MdEntry::Deletion(bases) => {
                write!(f, "^")?;
                for b in bases {
                    write!(f, "{}", *b as char)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating digits of a match-run count (the initial state).
    ExpectNumber,
    /// One mismatch base has been read and is pending a flush.
    AfterMismatch,
    /// A `^` was just read; at least one deleted base must follow.
    AfterCaret,
    /// Accumulating deleted reference bases.
    InDeletion,
}

fn bad(pos: usize, reason: String) -> AlignError {
    AlignError::MalformedMdTag { pos, reason }
}

/// Decode an MD tag value into its entry list. The empty string is valid
/// and decodes to no entries.
pub fn parse_md(md: &str) -> Result<Vec<MdEntry>, AlignError> {
    let mut entries = Vec::new();
    let mut state = State::ExpectNumber;
    let mut count: usize = 0;
    let mut have_digits = false;
    let mut pending_base: u8 = 0;
    let mut del_bases: Vec<u8> = Vec::new();

    for (pos, c) in md.char_indices() {
        // Flush-then-redispatch: a pending mismatch or deletion run is
        // emitted before the current character is interpreted again under
        // the number-state rules.
        match state {
            State::AfterMismatch => {
                entries.push(MdEntry::Mismatch(pending_base));
                state = State::ExpectNumber;
                if c.is_ascii_alphabetic() {
                    return Err(bad(
                        pos,
                        format!("unexpected base '{}' directly after a mismatch base", c),
                    ));
                }
            }
            State::InDeletion if !c.is_ascii_alphabetic() => {
                entries.push(MdEntry::Deletion(std::mem::take(&mut del_bases)));
                state = State::ExpectNumber;
            }
            _ => {}
        }

        match state {
            State::ExpectNumber => {
                if let Some(d) = c.to_digit(10) {
                    count = count
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(d as usize))
                        .ok_or_else(|| bad(pos, "match-run count overflows".to_string()))?;
                    have_digits = true;
                } else {
                    if have_digits {
                        entries.push(MdEntry::MatchRun(count));
                        count = 0;
                        have_digits = false;
                    }
                    if c == '^' {
                        state = State::AfterCaret;
                    } else if c.is_ascii_alphabetic() {
                        pending_base = c as u8;
                        state = State::AfterMismatch;
                    } else {
                        return Err(bad(pos, format!("unexpected character '{}'", c)));
                    }
                }
            }
            State::AfterCaret => {
                if c.is_ascii_alphabetic() {
                    del_bases.push(c as u8);
                    state = State::InDeletion;
                } else {
                    return Err(bad(
                        pos,
                        format!("expected a deleted base after '^', got '{}'", c),
                    ));
                }
            }
            State::InDeletion => {
                // Non-letters were redirected above, so this is a letter.
                del_bases.push(c as u8);
            }
            State::AfterMismatch => unreachable!("flushed before dispatch"),
        }
    }

    match state {
        State::ExpectNumber => {
            if have_digits {
                entries.push(MdEntry::MatchRun(count));
            }
        }
        State::AfterMismatch => {
            return Err(bad(
                md.len(),
                "MD tag ends immediately after a mismatch base".to_string(),
            ));
        }
        State::AfterCaret => {
            return Err(bad(md.len(), "MD tag ends with a bare '^'".to_string()));
        }
        State::InDeletion => {
            entries.push(MdEntry::Deletion(del_bases));
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(entries: &[MdEntry]) -> String {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_all_match() {
        assert_eq!(parse_md("76").unwrap(), vec![MdEntry::MatchRun(76)]);
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(parse_md("").unwrap().is_empty());
    }

    #[test]
    fn test_single_mismatch() {
        assert_eq!(
            parse_md("5A10").unwrap(),
            vec![
                MdEntry::MatchRun(5),
                MdEntry::Mismatch(b'A'),
                MdEntry::MatchRun(10),
            ]
        );
    }

    #[test]
    fn test_deletion() {
        assert_eq!(
            parse_md("3^AG3").unwrap(),
            vec![
                MdEntry::MatchRun(3),
                MdEntry::Deletion(b"AG".to_vec()),
                MdEntry::MatchRun(3),
            ]
        );
    }

    #[test]
    fn test_zero_count_between_events() {
        // "0" separating a mismatch from a deletion is a real zero-length
        // match run, not noise.
        assert_eq!(
            parse_md("10A0^AC6").unwrap(),
            vec![
                MdEntry::MatchRun(10),
                MdEntry::Mismatch(b'A'),
                MdEntry::MatchRun(0),
                MdEntry::Deletion(b"AC".to_vec()),
                MdEntry::MatchRun(6),
            ]
        );
    }

    #[test]
    fn test_number_directly_against_caret() {
        // The adjacency that trips up regex-based splitting.
        assert_eq!(
            parse_md("12^T4").unwrap(),
            vec![
                MdEntry::MatchRun(12),
                MdEntry::Deletion(b"T".to_vec()),
                MdEntry::MatchRun(4),
            ]
        );
    }

    #[test]
    fn test_adjacent_deletions() {
        assert_eq!(
            parse_md("1^A^C2").unwrap(),
            vec![
                MdEntry::MatchRun(1),
                MdEntry::Deletion(b"A".to_vec()),
                MdEntry::Deletion(b"C".to_vec()),
                MdEntry::MatchRun(2),
            ]
        );
    }

    #[test]
    fn test_consecutive_mismatch_bases_rejected() {
        // Two bare letters in a row can only occur inside a deletion.
        let err = parse_md("5AG5").unwrap_err();
        assert!(matches!(err, AlignError::MalformedMdTag { pos: 2, .. }));
    }

    #[test]
    fn test_trailing_mismatch_rejected() {
        assert!(parse_md("5A").is_err());
    }

    #[test]
    fn test_trailing_caret_rejected() {
        assert!(parse_md("5^").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_md("5?3").is_err());
        assert!(parse_md("^5").is_err());
    }

    #[test]
    fn test_deletion_at_end() {
        assert_eq!(
            parse_md("8^ACGT").unwrap(),
            vec![MdEntry::MatchRun(8), MdEntry::Deletion(b"ACGT".to_vec())]
        );
    }

    #[test]
    fn test_round_trip() {
        for s in ["76", "5A10", "3^AG3", "10A0^AC6", "0C37", "8^ACGT", "1^A^C2"] {
            let entries = parse_md(s).unwrap();
            assert_eq!(encode(&entries), s);
        }
    }
}
