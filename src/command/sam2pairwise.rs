//! `sam2pairwise`: render SAM records from stdin as pairwise alignments.

use std::io::BufRead;

use anyhow::Result;
use clap::Args;

use crate::pairwise::{parse_cigar, reconstruct, render::render_track, HighlightConfig};
use crate::utils::ansi;

#[derive(Args)]
pub struct Sam2PairwiseCMD {
    /// Known mutation whose exact REF>ALT change is marked instead of
    /// highlighted (e.g. C>T)
    #[arg(short = 'm', long = "mutation")]
    pub mutation: Option<String>,

    /// Single character marking the known mutation on the marker line
    #[arg(short = 'l', long = "mark", default_value = ".")]
    pub mark: String,

    /// Only process Read 1 Forward or Read 2 Reverse reads
    #[arg(short = 'f', long = "forward", default_value = "false")]
    pub forward: bool,

    /// Only process Read 1 Reverse or Read 2 Forward reads
    #[arg(short = 'r', long = "reverse", default_value = "false")]
    pub reverse: bool,

    /// Tag(s) to show on the info line; repeatable
    #[arg(short = 't', long = "tag", default_value = "MD")]
    pub tags: Vec<String>,

    /// Quality score cutoff below which query bases render as
    /// low-confidence (0 = disabled)
    #[arg(short = 'q', long = "quality-cutoff", default_value = "0")]
    pub quality_cutoff: u8,
}

impl Sam2PairwiseCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        if self.mark.chars().count() != 1 {
            anyhow::bail!("--mark must be a single character");
        }
        if self.forward && self.reverse {
            anyhow::bail!("cannot use --forward and --reverse together");
        }
        let known_mutation = match &self.mutation {
            None => None,
            Some(m) => Some(parse_mutation(m)?),
        };
        let config = HighlightConfig {
            known_mutation,
            mark: self.mark.chars().next().unwrap(),
            quality_cutoff: if self.quality_cutoff > 0 {
                Some(self.quality_cutoff)
            } else {
                None
            },
            ..HighlightConfig::default()
        };

        let stdin = std::io::stdin();
        let color = ansi::use_color();
        for line in stdin.lock().lines() {
            let line = line?;
            self.process_line(&line, &config, color);
        }
        Ok(())
    }

    fn process_line(&self, line: &str, config: &HighlightConfig, color: bool) {
        if line.is_empty() || line.starts_with('@') {
            return;
        }
        let record = match SamRecord::parse(line) {
            Some(r) => r,
            None => {
                log::error!("skipping SAM record with fewer than 11 fields: {}", line);
                return;
            }
        };

        if self.forward || self.reverse {
            let flag: u16 = match record.flag.parse() {
                Ok(f) => f,
                Err(_) => {
                    log::error!("skipping SAM record with invalid FLAG '{}'", record.flag);
                    return;
                }
            };
            if !passes_strand_filter(flag, self.forward) {
                return;
            }
        }

        let ops = match parse_cigar(record.cigar) {
            Ok(ops) => ops,
            Err(e) => {
                log::error!("skipping read {}: {}", record.qname, e);
                return;
            }
        };
        let qual = if record.qual == "*" { "" } else { record.qual };
        let md = record.tag_value("MD").unwrap_or("");
        let result = match reconstruct(record.seq.as_bytes(), qual.as_bytes(), &ops, md, config) {
            Ok(r) => r,
            Err(e) => {
                log::error!("skipping read {}: {}", record.qname, e);
                return;
            }
        };

        let tag_values = self
            .tags
            .iter()
            .map(|key| record.tag_value(key).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("|");
        let info = format!(
            "{} {} {} {} {} {}",
            record.qname, record.flag, record.rname, record.pos, record.cigar, tag_values
        );
        if color {
            println!("{}{}{}{}", ansi::DIM, ansi::ITALIC, info, ansi::RESET);
        } else {
            println!("{}", info);
        }
        println!("{}", render_track(&result.query, color));
        println!("{}", result.marker);
        println!("{}", render_track(&result.reference, color));
        println!();
    }
}

/// Parse a `REF>ALT` option value such as `C>T`.
fn parse_mutation(m: &str) -> Result<(u8, u8)> {
    let bytes = m.as_bytes();
    if bytes.len() != 3 || bytes[1] != b'>' {
        anyhow::bail!("--mutation format must be REF>ALT (e.g. C>T)");
    }
    Ok((bytes[0], bytes[2]))
}

/// The fields of one SAM alignment line we care about.
struct SamRecord<'a> {
    qname: &'a str,
    flag: &'a str,
    rname: &'a str,
    pos: &'a str,
    cigar: &'a str,
    seq: &'a str,
    qual: &'a str,
    optional: Vec<&'a str>,
}

impl<'a> SamRecord<'a> {
    fn parse(line: &'a str) -> Option<SamRecord<'a>> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            return None;
        }
        Some(SamRecord {
            qname: fields[0],
            flag: fields[1],
            rname: fields[2],
            pos: fields[3],
            cigar: fields[5],
            seq: fields[9],
            qual: fields[10],
            optional: fields[11..].to_vec(),
        })
    }

    /// Value of the optional field `TAG:TYPE:VALUE` with the given tag.
    fn tag_value(&self, key: &str) -> Option<&'a str> {
        self.optional.iter().find_map(|field| {
            let mut parts = field.splitn(3, ':');
            let tag = parts.next()?;
            let _typ = parts.next()?;
            let value = parts.next()?;
            (tag == key).then_some(value)
        })
    }
}

const FLAG_PAIRED: u16 = 0x1;
const FLAG_REVERSE: u16 = 0x10;
const FLAG_READ1: u16 = 0x40;
const FLAG_READ2: u16 = 0x80;

/// Strand filtering: `forward` keeps unpaired forward reads, R1-forward
/// and R2-reverse; `!forward` (reverse mode) keeps the complement set.
fn passes_strand_filter(flag: u16, forward: bool) -> bool {
    let paired = flag & FLAG_PAIRED != 0;
    let read1 = flag & FLAG_READ1 != 0;
    let read2 = flag & FLAG_READ2 != 0;
    let rev = flag & FLAG_REVERSE != 0;

    if forward {
        if !paired {
            !rev
        } else {
            (read1 && !rev) || (read2 && rev)
        }
    } else {
        if !paired {
            rev
        } else {
            (read1 && rev) || (read2 && !rev)
        }
    }
}
