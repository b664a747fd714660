//! End-to-end checks of the pairwise reconstruction pipeline through the
//! public API: raw CIGAR/MD strings in, rendered tracks out.

use bfx::pairwise::render::render_track;
use bfx::pairwise::{parse_cigar, reconstruct, AlignmentResult, HighlightConfig, Role};

fn align(seq: &str, cigar: &str, md: &str, cfg: &HighlightConfig) -> AlignmentResult {
    let ops = parse_cigar(cigar).unwrap();
    reconstruct(seq.as_bytes(), b"", &ops, md, cfg).unwrap()
}

#[test]
fn perfect_match_renders_identical_tracks() {
    let res = align("ACGTACGTAC", "10M", "10", &HighlightConfig::default());
    assert_eq!(res.reference_text(), "ACGTACGTAC");
    assert_eq!(res.query_text(), "ACGTACGTAC");
    assert_eq!(res.marker, "||||||||||");
    // Plain mode must be the raw characters, no escapes.
    assert_eq!(render_track(&res.query, false), "ACGTACGTAC");
}

#[test]
fn mismatch_insertion_deletion_combined() {
    // 3 matches, G>T mismatch, insertion, deletion of AC, 2 matches.
    let res = align("AAATGCC", "4M1I2D2M", "3G0^AC2", &HighlightConfig::default());
    assert_eq!(res.query_text(), "AAATG--CC");
    assert_eq!(res.reference_text(), "AAAG-ACCC");
    assert_eq!(res.marker, "|||    ||");
}

#[test]
fn tracks_always_have_equal_width() {
    for (seq, cigar, md) in [
        ("ACGTACGT", "8M", "8"),
        ("AAATGCC", "4M1I2D2M", "3G0^AC2"),
        ("TTAAAACC", "2S4M2S", "4"),
        ("AAAA", "2M100N2M", "4"),
        ("AAAA", "2M2P2M", "4"),
    ] {
        let res = align(seq, cigar, md, &HighlightConfig::default());
        assert_eq!(res.reference.len(), res.query.len(), "{}", cigar);
        assert_eq!(res.marker.chars().count(), res.query.len(), "{}", cigar);
    }
}

#[test]
fn long_intron_condenses_to_fixed_form() {
    let res = align("GGGG", "2M1000N2M", "4", &HighlightConfig::default());
    assert_eq!(res.reference_text(), "GGNNNNN..1000nt..NNNNNGG");
    assert!(res.query_text().starts_with("GG....."));
}

#[test]
fn known_mutation_is_marked_not_highlighted() {
    let cfg = HighlightConfig {
        known_mutation: Some((b'G', b'A')),
        mark: '*',
        ..HighlightConfig::default()
    };
    let res = align("CCACC", "5M", "2G2", &cfg);
    assert_eq!(res.marker, "||*||");
    assert_eq!(res.query[2].role, Role::Plain);

    // Any other substitution at a G stays highlighted.
    let res = align("CCTCC", "5M", "2G2", &cfg);
    assert_eq!(res.marker, "|| ||");
    assert_eq!(res.query[2].role, Role::Mismatch);
}

#[test]
fn quality_cutoff_dims_query_only() {
    let cfg = HighlightConfig {
        quality_cutoff: Some(25),
        ..HighlightConfig::default()
    };
    let ops = parse_cigar("4M").unwrap();
    // Phred 30, 5, 30, 30.
    let res = reconstruct(b"ACGT", b"?&??", &ops, "4", &cfg).unwrap();
    assert_eq!(res.query[1].role, Role::LowQuality);
    assert_eq!(res.reference[1].role, Role::Plain);
}

#[test]
fn missing_md_still_produces_a_display() {
    let res = align("ACGTACGT", "4M1I3M", "", &HighlightConfig::default());
    assert_eq!(res.query_text(), "ACGTACGT");
    assert_eq!(res.reference_text(), "NNNN-NNN");
}
