//! Single-record SAM pairwise alignment reconstruction.
//!
//! Given SEQ, QUAL, CIGAR and the MD:Z: optional field of one SAM record,
//! rebuild the three-line pairwise display (reference, marker, query).
//! The CIGAR and MD decoders are pure functions; the reconstructor walks
//! both in lockstep and tags every output position with a semantic role.
//! Turning roles into terminal colors is the renderer's job, so the core
//! stays output-target agnostic.

pub mod cigar;
pub mod md;
pub mod reconstruct;
pub mod render;

pub use cigar::{parse_cigar, CigarKind, CigarOp};
pub use md::{parse_md, MdEntry};
pub use reconstruct::{reconstruct, AlignmentResult, Cell, HighlightConfig, Role, Track};

use thiserror::Error;

/// Everything that can go wrong for one record. All failures are scoped to
/// the record being processed; batch drivers log and move on.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("malformed CIGAR at position {pos}: {reason}")]
    MalformedCigar { pos: usize, reason: String },

    /// Recoverable: the reconstructor falls back to an unknown reference
    /// for the rest of the record.
    #[error("malformed MD tag at position {pos}: {reason}")]
    MalformedMdTag { pos: usize, reason: String },

    /// The MD entry kind contradicts the current CIGAR operation, e.g. a
    /// `^`-deletion entry while consuming an M run. We abort rather than
    /// guess which of the two tags is lying.
    #[error("MD tag contradicts CIGAR: {0}")]
    CigarMdInconsistency(String),

    #[error("CIGAR asks for query base {needed} but sequence length is {len}")]
    SequenceTooShort { needed: usize, len: usize },

    /// Letter outside the SAM operation alphabet, from
    /// `CigarKind::from_char`. The string decoder reports these with a
    /// position as `MalformedCigar` instead.
    #[error("unsupported CIGAR operation '{0}'")]
    UnsupportedCigarOp(char),
}
