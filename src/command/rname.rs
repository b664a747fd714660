//! `rname`: identify sequencer model and flow cell type from read names.
//!
//! Illumina read names encode the instrument serial, run number, flow cell
//! and lane as the first colon-separated fields; the serial prefix and the
//! flow cell ID format are enough to pin down the machine and kit.

use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use clap::Args;
use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::ansi;
use crate::utils::open_input;
use crate::utils::Table;

struct IdPattern {
    regex: Regex,
    description: &'static str,
}

fn patterns(table: &[(&str, &'static str)]) -> Vec<IdPattern> {
    table
        .iter()
        .map(|(pattern, description)| IdPattern {
            regex: Regex::new(&format!("^{}$", pattern)).expect("invalid id pattern"),
            description,
        })
        .collect()
}

lazy_static! {
    /// Instrument serial prefixes, most specific first.
    static ref INSTRUMENT_IDS: Vec<IdPattern> = patterns(&[
        ("HWUSI", "Genome Analyzer IIx"),
        ("HWI-M[0-9]{4}", "MiSeq"),
        ("M[0-9]{5}", "MiSeq"),
        ("HWI-C[0-9]{5}", "HiSeq 1500"),
        ("C[0-9]{5}", "HiSeq 1500"),
        ("HWI-D[0-9]{5}", "HiSeq 2500"),
        ("D[0-9]{5}", "HiSeq 2500"),
        ("J[0-9]{5}", "HiSeq 3000"),
        ("K[0-9]{5}", "HiSeq 3000, HiSeq 4000"),
        ("E[0-9]{5}", "HiSeq X"),
        ("NB[0-9]{6}", "NextSeq 500/550"),
        ("NS[0-9]{6}", "NextSeq 500/550"),
        ("VH[0-9]{5}", "NextSeq 2000"),
        ("MN[0-9]{5}", "MiniSeq"),
        ("A[0-9]{5}", "NovaSeq"),
        ("NA[0-9]{5}", "NovaSeq"),
        ("LH[0-9]{5}", "NovaSeq X"),
        ("SN[0-9]{3}", "HiSeq2000, HiSeq2500"),
    ]);

    /// Flow cell ID formats, most specific first.
    static ref FLOWCELL_IDS: Vec<IdPattern> = patterns(&[
        ("BNT[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BRB[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BPC[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BPG[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BPA[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BPL[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("BTR[A-Z0-9]{5}-[A-Z0-9]{4}", "iSeq 100 Standard Output"),
        ("000H[A-Z0-9]{5}", "MiniSeq, Mid or High Output"),
        ("D[A-Z0-9]{4}", "MiSeq Nano"),
        ("G[A-Z0-9]{4}", "MiSeq Micro"),
        ("A[A-Z0-9]{4}", "MiSeq Standard v2"),
        ("B[A-Z0-9]{4}", "MiSeq Standard"),
        ("C[A-Z0-9]{4}", "MiSeq Standard"),
        ("J[A-Z0-9]{4}", "MiSeq Standard"),
        ("K[A-Z0-9]{4}", "MiSeq Standard"),
        ("L[A-Z0-9]{4}", "MiSeq Standard"),
        ("[A-Z0-9]{5}AF[A-Z0-9]{2}", "NextSeq 500/550 Mid Output"),
        ("[A-Z0-9]{5}AG[A-Z0-9]{2}", "NextSeq 500/550 High Output"),
        ("[A-Z0-9]{5}BG[A-Z0-9]{2}", "NextSeq 500/550 High Output"),
        ("[A-Z0-9]{7}M5", "NextSeq 1000/2000 P1 or P2"),
        ("[A-Z0-9]{7}HV", "NextSeq 1000/2000 P3"),
        ("[A-Z0-9]{7}NX", "NextSeq 1000/2000 XLEAP-SBS P4"),
        ("[A-Z0-9]{5}BC[A-Z0-9]{2}", "HiSeq 2500, Rapid Run (2-lane) v2"),
        ("[A-Z0-9]{5}AC[A-Z0-9]{2}", "HiSeq 2500, TrueSeq v3"),
        ("[A-Z0-9]{5}AN[A-Z0-9]{2}", "HiSeq 2500, High Output v3"),
        ("[A-Z0-9]{5}BB[A-Z0-9]{2}", "HiSeq 3000, HiSeq 4000, (8-lane) v1"),
        ("[A-Z0-9]{5}AL[A-Z0-9]{2}", "HiSeq X, (8-lane)"),
        ("[A-Z0-9]{5}CC[A-Z0-9]{2}", "HiSeq X, (8-lane)"),
        ("[A-Z0-9]{5}DR[A-Z0-9]{2}", "NovaSeq 6000 SP or S1"),
        ("[A-Z0-9]{5}DM[A-Z0-9]{2}", "NovaSeq 6000 S2"),
        ("[A-Z0-9]{5}DS[A-Z0-9]{2}", "NovaSeq 6000 S4"),
        ("[A-Z0-9]{6}LT3", "NovaSeq X Plus 10B"),
        ("[A-Z0-9]{6}LT4", "NovaSeq X Plus 25B"),
        ("[A-Z0-9]{6}LT[A-Z0-9]", "NovaSeq X, NovaSeq X Plus, Unknown flow cell"),
    ]);
}

#[derive(Args)]
pub struct RnameCMD {
    /// FASTQ files (plain or .gz), literal read names, or `-` for stdin
    #[arg(value_parser, required = true)]
    pub inputs: Vec<String>,

    /// Render results as a table
    #[arg(short = 'p', long = "pretty", default_value = "false")]
    pub pretty: bool,
}

#[derive(Debug, Default)]
struct RnameReport {
    input: String,
    instrument_id: String,
    instrument_type: String,
    run: String,
    flowcell_id: String,
    flowcell_type: String,
    lane: String,
    error: Option<String>,
}

impl RnameCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let reports: Vec<RnameReport> = self
            .inputs
            .iter()
            .map(|input| analyze_input(input))
            .collect();

        if self.pretty {
            print_table(&reports);
        } else if reports.len() > 1 {
            print_tsv(&reports);
        } else {
            print_single(&reports[0]);
        }
        Ok(())
    }
}

fn analyze_input(input: &str) -> RnameReport {
    let mut report = RnameReport {
        input: input.to_string(),
        ..RnameReport::default()
    };
    let rname = match extract_rname(input) {
        Ok(r) => r,
        Err(e) => {
            report.error = Some(format!("{:#}", e));
            return report;
        }
    };
    match parse_rname(&rname) {
        Some(parsed) => {
            report.instrument_type = classify(&INSTRUMENT_IDS, &parsed.instrument);
            report.flowcell_type = classify(&FLOWCELL_IDS, &parsed.flowcell);
            report.instrument_id = parsed.instrument;
            report.run = parsed.run;
            report.flowcell_id = parsed.flowcell;
            report.lane = parsed.lane.unwrap_or_else(|| "N/A".to_string());
        }
        None => {
            report.error = Some(format!(
                "invalid read name '{}' (expected at least 3 colon-separated parts)",
                rname
            ));
        }
    }
    report
}

struct ParsedRname {
    instrument: String,
    run: String,
    flowcell: String,
    lane: Option<String>,
}

fn parse_rname(rname: &str) -> Option<ParsedRname> {
    let parts: Vec<&str> = rname.split(':').collect();
    if parts.len() < 3 {
        return None;
    }
    Some(ParsedRname {
        instrument: parts[0].to_string(),
        run: parts[1].to_string(),
        flowcell: parts[2].to_string(),
        lane: parts.get(3).map(|s| s.to_string()),
    })
}

/// First matching description, or "Unknown".
fn classify(table: &[IdPattern], id: &str) -> String {
    table
        .iter()
        .find(|p| p.regex.is_match(id))
        .map(|p| p.description.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Pull the first read name out of the input: the first line of a FASTQ
/// file if the input names one, otherwise the input itself taken as a
/// literal read name. `-` reads from stdin.
fn extract_rname(input: &str) -> Result<String> {
    let path = Path::new(input);
    if input == "-" || path.is_file() {
        let reader = open_input(path)?;
        let line = reader
            .lines()
            .next()
            .transpose()?
            .ok_or_else(|| anyhow::anyhow!("no data read from '{}'", input))?;
        first_name_token(&line)
            .ok_or_else(|| anyhow::anyhow!("empty read name line in '{}'", input))
    } else if path.is_dir() {
        anyhow::bail!("'{}' is a directory", input);
    } else {
        first_name_token(input)
            .ok_or_else(|| anyhow::anyhow!("empty read name string '{}'", input))
    }
}

fn first_name_token(line: &str) -> Option<String> {
    line.trim_start_matches('@')
        .split_whitespace()
        .next()
        .map(|s| s.to_string())
}

fn print_single(report: &RnameReport) {
    if let Some(err) = &report.error {
        println!("Error processing input '{}': {}", report.input, err);
        return;
    }
    println!("Input          : {}", report.input);
    println!(
        "Instrument ID  : {} -> {}",
        report.instrument_id, report.instrument_type
    );
    println!("Instrument Run : {}", report.run);
    println!(
        "Flow cell ID   : {} -> {}",
        report.flowcell_id, report.flowcell_type
    );
    println!("Lane ID        : {}", report.lane);
}

fn print_tsv(reports: &[RnameReport]) {
    println!("Input\tInstrumentID\tInstrumentType\tRun\tFlowcellID\tFlowcellType\tLane\tStatus");
    for r in reports {
        let status = match &r.error {
            Some(e) => format!("Error: {}", e.replace('\t', " ")),
            None => "OK".to_string(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.input,
            r.instrument_id,
            r.instrument_type,
            r.run,
            r.flowcell_id,
            r.flowcell_type,
            r.lane,
            status
        );
    }
}

fn print_table(reports: &[RnameReport]) {
    let color = ansi::use_color();
    let mut table = Table::new();
    table.set_headers(
        ["Input", "Instrument ID", "Type", "Run", "Flowcell ID", "Type", "Lane", "Status"]
            .map(|h| ansi::paint(h, ansi::BOLD, color)),
    );
    for r in reports {
        let status = match &r.error {
            Some(e) => ansi::paint(&format!("Error: {}", e), ansi::FG_YELLOW, color),
            None => ansi::paint("OK", ansi::FG_GREEN, color),
        };
        let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };
        table.add_row([
            r.input.clone(),
            or_na(&r.instrument_id),
            or_na(&r.instrument_type),
            or_na(&r.run),
            or_na(&r.flowcell_id),
            or_na(&r.flowcell_type),
            or_na(&r.lane),
            status,
        ]);
    }
    table.print();
}
