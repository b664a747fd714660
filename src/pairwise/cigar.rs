//! CIGAR string decoding.

use std::fmt;

use super::AlignError;

/// One CIGAR operation kind, SAM column 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarKind {
    /// `M`, alignment match or mismatch
    Match,
    /// `I`, insertion relative to the reference
    Insertion,
    /// `D`, deletion from the reference
    Deletion,
    /// `N`, skipped reference region (intron)
    RefSkip,
    /// `S`, soft clip; bases present in SEQ
    SoftClip,
    /// `H`, hard clip; bases absent from SEQ
    HardClip,
    /// `P`, padding
    Padding,
    /// `=`, sequence match
    SeqMatch,
    /// `X`, sequence mismatch
    SeqMismatch,
}

impl CigarKind {
    pub fn from_char(c: char) -> Result<CigarKind, AlignError> {
        match c {
            'M' => Ok(CigarKind::Match),
            'I' => Ok(CigarKind::Insertion),
            'D' => Ok(CigarKind::Deletion),
            'N' => Ok(CigarKind::RefSkip),
            'S' => Ok(CigarKind::SoftClip),
            'H' => Ok(CigarKind::HardClip),
            'P' => Ok(CigarKind::Padding),
            '=' => Ok(CigarKind::SeqMatch),
            'X' => Ok(CigarKind::SeqMismatch),
            _ => Err(AlignError::UnsupportedCigarOp(c)),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            CigarKind::Match => 'M',
            CigarKind::Insertion => 'I',
            CigarKind::Deletion => 'D',
            CigarKind::RefSkip => 'N',
            CigarKind::SoftClip => 'S',
            CigarKind::HardClip => 'H',
            CigarKind::Padding => 'P',
            CigarKind::SeqMatch => '=',
            CigarKind::SeqMismatch => 'X',
        }
    }

    /// Does this operation consume bases of the stored query sequence?
    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarKind::Match
                | CigarKind::Insertion
                | CigarKind::SoftClip
                | CigarKind::SeqMatch
                | CigarKind::SeqMismatch
        )
    }

    /// Does this operation consume reference bases accounted for by MD?
    pub fn consumes_md(&self) -> bool {
        matches!(
            self,
            CigarKind::Match | CigarKind::Deletion | CigarKind::SeqMatch | CigarKind::SeqMismatch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub len: usize,
    pub kind: CigarKind,
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind.as_char())
    }
}

/// Parse a CIGAR string into its operation list.
///
/// The unmapped placeholder `*` and the empty string both decode to an
/// empty list; that is not an error. Every operation character must carry
/// a positive run length.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>, AlignError> {
    if cigar == "*" || cigar.is_empty() {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut len: usize = 0;
    let mut have_digits = false;

    for (pos, c) in cigar.char_indices() {
        if let Some(d) = c.to_digit(10) {
            len = len
                .checked_mul(10)
                .and_then(|v| v.checked_add(d as usize))
                .ok_or_else(|| AlignError::MalformedCigar {
                    pos,
                    reason: "operation length overflows".to_string(),
                })?;
            have_digits = true;
        } else if c.is_ascii_alphabetic() || c == '=' {
            let kind = CigarKind::from_char(c).map_err(|_| AlignError::MalformedCigar {
                pos,
                reason: format!("unknown operation '{}'", c),
            })?;
            if !have_digits {
                return Err(AlignError::MalformedCigar {
                    pos,
                    reason: format!("operation '{}' has no preceding length", c),
                });
            }
            if len == 0 {
                return Err(AlignError::MalformedCigar {
                    pos,
                    reason: format!("zero-length operation '{}'", c),
                });
            }
            ops.push(CigarOp { len, kind });
            len = 0;
            have_digits = false;
        } else {
            return Err(AlignError::MalformedCigar {
                pos,
                reason: format!("invalid character '{}'", c),
            });
        }
    }

    if have_digits {
        return Err(AlignError::MalformedCigar {
            pos: cigar.len(),
            reason: format!("trailing length {} without an operation", len),
        });
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(ops: &[CigarOp]) -> String {
        ops.iter().map(|op| op.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let ops = parse_cigar("10M2I3D").unwrap();
        assert_eq!(
            ops,
            vec![
                CigarOp { len: 10, kind: CigarKind::Match },
                CigarOp { len: 2, kind: CigarKind::Insertion },
                CigarOp { len: 3, kind: CigarKind::Deletion },
            ]
        );
    }

    #[test]
    fn test_unmapped_and_empty() {
        assert!(parse_cigar("*").unwrap().is_empty());
        assert!(parse_cigar("").unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        for s in ["76M", "5S70M1I20M4H", "10M1000N10M", "3=1X4=", "8M2P8M"] {
            let ops = parse_cigar(s).unwrap();
            assert_eq!(encode(&ops), s);
        }
    }

    #[test]
    fn test_missing_length() {
        assert!(matches!(
            parse_cigar("M"),
            Err(AlignError::MalformedCigar { pos: 0, .. })
        ));
        assert!(matches!(
            parse_cigar("10MI"),
            Err(AlignError::MalformedCigar { pos: 3, .. })
        ));
    }

    #[test]
    fn test_zero_length() {
        assert!(matches!(
            parse_cigar("0M"),
            Err(AlignError::MalformedCigar { .. })
        ));
    }

    #[test]
    fn test_trailing_digits() {
        assert!(matches!(
            parse_cigar("10M5"),
            Err(AlignError::MalformedCigar { .. })
        ));
    }

    #[test]
    fn test_unknown_operation_is_a_parse_error() {
        assert!(matches!(
            parse_cigar("10Z"),
            Err(AlignError::MalformedCigar { pos: 2, .. })
        ));
        assert!(matches!(
            parse_cigar("10M#"),
            Err(AlignError::MalformedCigar { .. })
        ));
    }

    #[test]
    fn test_kind_from_char() {
        assert_eq!(CigarKind::from_char('M').unwrap(), CigarKind::Match);
        assert_eq!(CigarKind::from_char('=').unwrap(), CigarKind::SeqMatch);
        assert!(matches!(
            CigarKind::from_char('Z'),
            Err(AlignError::UnsupportedCigarOp('Z'))
        ));
    }

    #[test]
    fn test_query_consumption() {
        assert!(CigarKind::Match.consumes_query());
        assert!(CigarKind::SoftClip.consumes_query());
        assert!(!CigarKind::Deletion.consumes_query());
        assert!(!CigarKind::HardClip.consumes_query());
        assert!(CigarKind::Deletion.consumes_md());
        assert!(!CigarKind::Insertion.consumes_md());
    }
}
