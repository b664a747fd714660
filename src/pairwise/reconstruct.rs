//! Alignment reconstruction from CIGAR + MD.
//!
//! Walks the CIGAR operation list while consuming query bases and MD
//! entries through two independent cursors. CIGAR run lengths and MD entry
//! lengths do not line up one-to-one (a single deletion may span several MD
//! entries and vice versa), so the MD cursor keeps a sub-position inside
//! the current entry across operations.

use super::cigar::{CigarKind, CigarOp};
use super::md::{parse_md, MdEntry};
use super::AlignError;

/// Unknown reference base placeholder, used when MD is absent or exhausted.
const UNKNOWN_REF: u8 = b'N';
/// Number of placeholder characters on each side of a condensed intron.
const INTRON_EDGE: usize = 5;

/// Semantic role of one output position. The renderer decides what each
/// role looks like on a given output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Ordinary, unhighlighted position.
    Plain,
    /// Highlighted difference between query and reference.
    Mismatch,
    /// Structural gap: insertion, deletion or soft clip.
    Gap,
    /// Query base below the quality cutoff; takes precedence over the
    /// match/mismatch coloring of that position.
    LowQuality,
    /// Matching base at the configured site of interest.
    MatchOfInterest,
    /// CIGAR `P` padding.
    Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: u8,
    pub role: Role,
}

pub type Track = Vec<Cell>;

/// Three parallel tracks of equal display width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub reference: Track,
    pub query: Track,
    pub marker: String,
}

impl AlignmentResult {
    pub fn reference_text(&self) -> String {
        self.reference.iter().map(|c| c.ch as char).collect()
    }

    pub fn query_text(&self) -> String {
        self.query.iter().map(|c| c.ch as char).collect()
    }
}

/// Caller-supplied highlighting options, read-only during reconstruction.
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Expected `(reference, alternate)` mutation. The exact REF>ALT change
    /// is marked rather than highlighted; anything else touching REF is
    /// flagged as an anomaly.
    pub known_mutation: Option<(u8, u8)>,
    /// Marker-track character for the expected mutation.
    pub mark: char,
    /// Phred cutoff below which query bases render as low-confidence.
    pub quality_cutoff: Option<u8>,
    /// `N` runs strictly longer than this collapse to a condensed form.
    pub intron_collapse: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            known_mutation: None,
            mark: '.',
            quality_cutoff: None,
            intron_collapse: 20,
        }
    }
}

/// Cursor over the decoded MD entries: entry index plus offset within the
/// current entry. `available` drops to false once MD is missing, failed to
/// decode, or ran out before CIGAR did; from then on the reference is
/// unknown.
#[derive(Debug)]
struct MdCursor {
    entries: Vec<MdEntry>,
    idx: usize,
    sub: usize,
    available: bool,
}

impl MdCursor {
    fn new(md_raw: &str) -> MdCursor {
        if md_raw.is_empty() {
            return MdCursor { entries: Vec::new(), idx: 0, sub: 0, available: false };
        }
        match parse_md(md_raw) {
            Ok(entries) => MdCursor { entries, idx: 0, sub: 0, available: true },
            Err(e) => {
                // Recoverable per the error policy: render the reference as
                // unknown rather than dropping the record.
                log::warn!("ignoring undecodable MD tag '{}': {}", md_raw, e);
                MdCursor { entries: Vec::new(), idx: 0, sub: 0, available: false }
            }
        }
    }

    /// Zero-length match runs separate adjacent events and consume nothing.
    fn skip_zero_runs(&mut self) {
        while matches!(self.entries.get(self.idx), Some(MdEntry::MatchRun(0))) {
            self.idx += 1;
        }
    }

    /// True once every entry has been consumed.
    fn exhausted(&mut self) -> bool {
        self.skip_zero_runs();
        self.idx >= self.entries.len()
    }
}

/// Reference base and mismatch flag for one aligned (M/=/X) position.
struct AlignedBase {
    ref_base: u8,
    is_mismatch: bool,
}

/// Consume one aligned position from the MD cursor. Returns `None` when MD
/// has nothing left to say about the reference.
fn next_aligned_base(cursor: &mut MdCursor, read_base: u8) -> Result<Option<AlignedBase>, AlignError> {
    if !cursor.available || cursor.exhausted() {
        return Ok(None);
    }
    match &cursor.entries[cursor.idx] {
        MdEntry::MatchRun(n) => {
            cursor.sub += 1;
            if cursor.sub == *n {
                cursor.idx += 1;
                cursor.sub = 0;
            }
            Ok(Some(AlignedBase { ref_base: read_base, is_mismatch: false }))
        }
        MdEntry::Mismatch(b) => {
            let ref_base = *b;
            cursor.idx += 1;
            cursor.sub = 0;
            Ok(Some(AlignedBase { ref_base, is_mismatch: true }))
        }
        MdEntry::Deletion(_) => Err(AlignError::CigarMdInconsistency(format!(
            "deletion entry at MD index {} while consuming an aligned (M/=/X) base",
            cursor.idx
        ))),
    }
}

/// Per-position highlighting decision for aligned bases: role shared by
/// both tracks plus the marker character.
fn classify(read_base: u8, ref_base: u8, is_mismatch: bool, cfg: &HighlightConfig) -> (Role, char) {
    match cfg.known_mutation {
        Some((known_ref, known_alt)) => {
            if is_mismatch {
                if ref_base == known_ref && read_base == known_alt {
                    // The expected mutation: marked, not highlighted.
                    (Role::Plain, cfg.mark)
                } else {
                    (Role::Mismatch, ' ')
                }
            } else if ref_base == known_ref {
                // Site of interest currently matching the reference.
                (Role::MatchOfInterest, '|')
            } else {
                (Role::Plain, '|')
            }
        }
        None => {
            if is_mismatch {
                (Role::Mismatch, ' ')
            } else {
                (Role::Plain, '|')
            }
        }
    }
}

fn is_low_quality(qual: &[u8], pos: usize, cfg: &HighlightConfig) -> bool {
    match cfg.quality_cutoff {
        Some(cutoff) if cutoff > 0 && pos < qual.len() => {
            // Phred+33 encoding.
            qual[pos].saturating_sub(33) < cutoff
        }
        _ => false,
    }
}

fn push(track: &mut Track, ch: u8, role: Role) {
    track.push(Cell { ch, role });
}

/// Disagreement between the query bases CIGAR consumed and what SEQ
/// actually provides.
fn consumption_mismatch(consumed: usize, seq_len: usize) -> Option<String> {
    if consumed == seq_len {
        return None;
    }
    Some(format!(
        "CIGAR consumed {} query bases but SEQ has {}",
        consumed, seq_len
    ))
}

/// Reconstruct the pairwise display for one record.
///
/// `md_raw` is the raw MD:Z: value; it is decoded internally and a decode
/// failure only degrades the reference to unknown bases. Fatal errors are
/// limited to CIGAR over-consuming the query and MD/CIGAR contradictions.
pub fn reconstruct(
    seq: &[u8],
    qual: &[u8],
    ops: &[CigarOp],
    md_raw: &str,
    cfg: &HighlightConfig,
) -> Result<AlignmentResult, AlignError> {
    let mut reference: Track = Vec::with_capacity(seq.len());
    let mut query: Track = Vec::with_capacity(seq.len());
    let mut marker = String::with_capacity(seq.len());
    let mut md = MdCursor::new(md_raw);
    let mut seq_pos = 0usize;

    for op in ops {
        match op.kind {
            CigarKind::Match | CigarKind::SeqMatch | CigarKind::SeqMismatch => {
                for _ in 0..op.len {
                    let read_base = *seq.get(seq_pos).ok_or(AlignError::SequenceTooShort {
                        needed: seq_pos + 1,
                        len: seq.len(),
                    })?;

                    let aligned = match next_aligned_base(&mut md, read_base)? {
                        Some(a) => a,
                        None => {
                            if md.available {
                                log::warn!("MD tag exhausted before CIGAR; reference unknown from here on");
                                md.available = false;
                            }
                            // Without MD the reference is unknowable, except
                            // that `=` guarantees a match and `X` a mismatch.
                            if op.kind == CigarKind::SeqMatch {
                                AlignedBase { ref_base: read_base, is_mismatch: false }
                            } else {
                                AlignedBase { ref_base: UNKNOWN_REF, is_mismatch: true }
                            }
                        }
                    };

                    let (role, mark) = classify(read_base, aligned.ref_base, aligned.is_mismatch, cfg);
                    let query_role = if is_low_quality(qual, seq_pos, cfg) {
                        Role::LowQuality
                    } else {
                        role
                    };
                    push(&mut query, read_base, query_role);
                    push(&mut reference, aligned.ref_base, role);
                    marker.push(mark);
                    seq_pos += 1;
                }
            }

            CigarKind::Insertion => {
                for _ in 0..op.len {
                    let read_base = *seq.get(seq_pos).ok_or(AlignError::SequenceTooShort {
                        needed: seq_pos + 1,
                        len: seq.len(),
                    })?;
                    let query_role = if is_low_quality(qual, seq_pos, cfg) {
                        Role::LowQuality
                    } else {
                        Role::Gap
                    };
                    push(&mut query, read_base, query_role);
                    push(&mut reference, b'-', Role::Gap);
                    marker.push(' ');
                    seq_pos += 1;
                }
            }

            CigarKind::Deletion => {
                let mut taken = 0usize;
                while taken < op.len {
                    if !md.available || md.exhausted() {
                        if md.available {
                            log::warn!("MD tag exhausted inside a deletion; reference unknown from here on");
                            md.available = false;
                        }
                        for _ in taken..op.len {
                            push(&mut query, b'-', Role::Gap);
                            push(&mut reference, UNKNOWN_REF, Role::Gap);
                            marker.push(' ');
                        }
                        break;
                    }
                    match &md.entries[md.idx] {
                        MdEntry::Deletion(bases) => {
                            // One MD deletion entry may be split across
                            // several CIGAR D operations and vice versa.
                            let available = bases.len() - md.sub;
                            let wanted = op.len - taken;
                            let n = wanted.min(available);
                            for b in &bases[md.sub..md.sub + n] {
                                push(&mut query, b'-', Role::Gap);
                                push(&mut reference, *b, Role::Gap);
                                marker.push(' ');
                            }
                            taken += n;
                            md.sub += n;
                            if md.sub == bases.len() {
                                md.idx += 1;
                                md.sub = 0;
                            }
                        }
                        entry => {
                            return Err(AlignError::CigarMdInconsistency(format!(
                                "{:?} at MD index {} while consuming a deletion",
                                entry, md.idx
                            )));
                        }
                    }
                }
            }

            CigarKind::RefSkip => {
                if op.len > cfg.intron_collapse {
                    // Condense very long introns to a fixed-width form so a
                    // multi-kilobase gap does not explode the display.
                    let middle = format!("..{}nt..", op.len);
                    for _ in 0..INTRON_EDGE {
                        push(&mut reference, UNKNOWN_REF, Role::Plain);
                        push(&mut query, b'.', Role::Plain);
                    }
                    for b in middle.bytes() {
                        push(&mut reference, b, Role::Plain);
                        push(&mut query, b, Role::Plain);
                    }
                    for _ in 0..INTRON_EDGE {
                        push(&mut reference, UNKNOWN_REF, Role::Plain);
                        push(&mut query, b'.', Role::Plain);
                    }
                    for _ in 0..INTRON_EDGE * 2 + middle.len() {
                        marker.push(' ');
                    }
                } else {
                    for _ in 0..op.len {
                        push(&mut reference, UNKNOWN_REF, Role::Plain);
                        push(&mut query, b'.', Role::Plain);
                        marker.push(' ');
                    }
                }
            }

            CigarKind::SoftClip => {
                for _ in 0..op.len {
                    let read_base = *seq.get(seq_pos).ok_or(AlignError::SequenceTooShort {
                        needed: seq_pos + 1,
                        len: seq.len(),
                    })?;
                    let query_role = if is_low_quality(qual, seq_pos, cfg) {
                        Role::LowQuality
                    } else {
                        Role::Gap
                    };
                    push(&mut query, read_base, query_role);
                    push(&mut reference, b'.', Role::Plain);
                    marker.push(' ');
                    seq_pos += 1;
                }
            }

            CigarKind::HardClip => {}

            CigarKind::Padding => {
                for _ in 0..op.len {
                    push(&mut query, b'*', Role::Padding);
                    push(&mut reference, b'*', Role::Padding);
                    marker.push(' ');
                }
            }
        }
    }

    // CIGAR/SEQ length disagreement is common in the wild and not worth
    // dropping the record over. Unmapped records (empty CIGAR) carry SEQ
    // legitimately, so only mapped records are checked.
    if !ops.is_empty() {
        if let Some(msg) = consumption_mismatch(seq_pos, seq.len()) {
            log::warn!("{}", msg);
        }
        if !qual.is_empty() && qual.len() != seq.len() {
            log::warn!(
                "QUAL length {} does not match SEQ length {}",
                qual.len(),
                seq.len()
            );
        }
    }

    Ok(AlignmentResult { reference, query, marker })
}
