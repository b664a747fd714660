//! `rc`: DNA reverse complement filter.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::utils::open_input;

#[derive(Args)]
pub struct RcCMD {
    /// Sequence file, one sequence per line; defaults to stdin
    #[arg(value_parser, default_value = "-")]
    pub path: PathBuf,
}

impl RcCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let reader = open_input(&self.path)?;
        for line in reader.lines() {
            let line = line?;
            println!("{}", revcomp_iupac(line.as_bytes()));
        }
        Ok(())
    }
}

/// Complement including IUPAC ambiguity codes; anything unrecognized
/// becomes `N`. Case is not preserved.
fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'M' => b'K',
        b'K' => b'M',
        b'R' => b'Y',
        b'Y' => b'R',
        b'W' => b'W',
        b'S' => b'S',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'N' => b'N',
        _ => b'N',
    }
}

fn revcomp_iupac(seq: &[u8]) -> String {
    seq.iter()
        .rev()
        .map(|&b| complement(b) as char)
        .collect()
}
