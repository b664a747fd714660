//! `fastq`: colorized FASTQ viewing with adapter detection.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use seq_io::fastq::{Reader as FastqReader, Record as FastqRecord};

use crate::utils::ansi;
use crate::utils::open_input;

/// Fraction of adapter positions allowed to mismatch during detection.
const ADAPTER_MISMATCH_RATE: f64 = 0.05;

/// Common Illumina/ABI adapter and primer sequences screened against the
/// 3' end of each read.
const ADAPTER_SEQUENCES: &[&[u8]] = &[
    b"GATCGGAAGAGCTCGTATGCCGTCTTCTGCTTG",
    b"CAAGCAGAAGACGGCATACGAGCTCTTCCGATCT",
    b"AATGATACGGCGACCACCGAGATCTACACTCTTTCCCTACACGACGCTCTTCCGATCT",
    b"GATCGGAAGAGCGGTTCAGCAGGAATGCCGAG",
    b"CAAGCAGAAGACGGCATACGAGATCGGTCTCGGCATTCCTGCTGAACCGCTCTTCCGATCT",
    b"ACACTCTTTCCCTACACGACGCTCTTCCGATCT",
    b"ACAGGTTCAGAGTTCTACAGTCCGAC",
    b"CAAGCAGAAGACGGCATACGA",
    b"CGACAGGTTCAGAGTTCTACAGTCCGACGATC",
    b"TGGAATTCTCGGGTGCCAAGG",
    b"GATCGGAAGAGCACACGTCT",
    b"GTGACTGGAGTTCAGACGTGTGCTCTTCCGATCT",
    b"CGGTCTCGGCATTCCTGCTGAACCGCTCTTCCGATCT",
    b"CTGATCTAGAGGTACCGGATCCCAGCAGT",
    b"CTGCCCCGGGTTCCTCATTCTCTCAGCAGCATG",
    b"CCACTACGCCTCCGCTTTCCTCTCTATGGGCAGTCGGTGAT",
    b"GATCGGAAGAGCACACGTCTGAACTCCAGTCAC",
    b"GATCGGAAGAGCACACGTCTGAACTCCAGTCACCGATGTATCTCGTATGCCGTCTTCTGCTTG",
    b"GATCGGAAGAGCACACGTCTGAACTCCAGTCACTTAGGCATCTCGTATGCCGTCTTCTGCTTG",
    b"GATCGGAAGAGCACACGTCTGAACTCCAGTCACACTTGAATCTCGTATGCCGTCTTCTGCTTG",
    b"GATCGGAAGAGCACACGTCTGAACTCCAGTCACGATCAGATCTCGTATGCCGTCTTCTGCTTG",
];

#[derive(Args)]
pub struct FastqCMD {
    /// FASTQ file, plain or gzip; defaults to stdin
    #[arg(value_parser, default_value = "-")]
    pub path: PathBuf,
}

impl FastqCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let reader = open_input(&self.path)?;
        let color = ansi::use_color();
        let mut fastq = FastqReader::new(reader);
        while let Some(record) = fastq.next() {
            let record = record?;
            let name = String::from_utf8_lossy(record.head());
            println!("{}", ansi::paint(&name, ansi::ITALIC, color));
            println!("{}", colorize_sequence(record.seq(), color));
            println!("{}", visualize_quality(record.qual(), color));
        }
        Ok(())
    }
}

fn mismatches(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// First position where a known adapter matches within the allowed
/// mismatch budget. The contaminated region extends to the end of the read.
fn find_adapter_start(seq: &[u8]) -> Option<usize> {
    for adapter in ADAPTER_SEQUENCES {
        if adapter.len() > seq.len() {
            continue;
        }
        let budget = (ADAPTER_MISMATCH_RATE * adapter.len() as f64).ceil() as usize;
        for start in 0..=seq.len() - adapter.len() {
            if mismatches(&seq[start..start + adapter.len()], adapter) <= budget {
                return Some(start);
            }
        }
    }
    None
}

fn colorize_sequence(seq: &[u8], color: bool) -> String {
    if !color {
        return String::from_utf8_lossy(seq).into_owned();
    }
    let adapter_start = find_adapter_start(seq).unwrap_or(seq.len());
    let mut out = String::with_capacity(seq.len() * 4);
    for (i, &b) in seq.iter().enumerate() {
        if i >= adapter_start {
            out.push_str(ansi::DIM);
            out.push(b as char);
            out.push_str(ansi::RESET);
        } else if let Some(bg) = ansi::base_background(b) {
            out.push_str(bg);
            out.push(b as char);
            out.push_str(ansi::RESET);
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Phred score rendered as a block character ramp.
fn block_char(score: u8) -> char {
    match score {
        40.. => '█',
        30..=39 => '▓',
        20..=29 => '▒',
        10..=19 => '░',
        _ => ' ',
    }
}

fn visualize_quality(qual: &[u8], color: bool) -> String {
    let blocks: String = qual
        .iter()
        .map(|&q| block_char(q.saturating_sub(33)))
        .collect();
    ansi::paint(&blocks, ansi::DIM, color)
}
