//! `checkbarcode`: verify barcode uniformity across sample FASTQ files.
//!
//! Reads a tab-separated sample sheet (`sample<TAB>fastq_path` per line),
//! pulls the most common index barcode from the first records of each
//! file, and flags sample groups whose files disagree. Barcodes within a
//! group are compared on the shortest barcode's length with `N` as a
//! wildcard, since demultiplexers disagree about index trimming.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use crossbeam::channel;
use lazy_static::lazy_static;
use linya::Progress;
use regex::Regex;
use seq_io::fastq::{Reader as FastqReader, Record as FastqRecord};

use crate::utils::ansi;
use crate::utils::Table;

lazy_static! {
    static ref BARCODE_RE: Regex = Regex::new("^[ACGTN+]+$").expect("invalid barcode regex");
}

#[derive(Args)]
pub struct CheckBarcodeCMD {
    /// Sample sheet: one `sample<TAB>fastq_path` row per file, paths
    /// relative to the sheet
    #[arg(value_parser)]
    pub sheet: PathBuf,

    /// Number of FASTQ records to inspect per file
    #[arg(short = 'n', long = "num-records", default_value = "100")]
    pub num_records: usize,

    /// Number of worker threads
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    pub num_threads: Option<usize>,
}

#[derive(Debug, serde::Deserialize, Clone)]
struct SheetRow {
    sample: String,
    path: PathBuf,
}

#[derive(Debug)]
struct ScanResult {
    sample: String,
    path: PathBuf,
    /// Most common barcode, or a short status describing the failure.
    barcode: Result<String, String>,
}

impl CheckBarcodeCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let rows = read_sheet(&self.sheet)?;
        if rows.is_empty() {
            println!("no files listed in {}", self.sheet.display());
            return Ok(());
        }
        let num_threads = self
            .num_threads
            .unwrap_or_else(|| 4.min(rows.len()).max(1));

        let mut results = scan_files(&rows, self.num_records, num_threads);
        results.sort_by(|a, b| (&a.sample, &a.path).cmp(&(&b.sample, &b.path)));

        let uniform = group_uniformity(&results);
        print_results(&results, &uniform, &self.sheet, self.num_records);
        Ok(())
    }
}

/// Load the sample sheet, resolving relative paths against its directory.
fn read_sheet(sheet: &Path) -> Result<Vec<SheetRow>> {
    let file = File::open(sheet)
        .with_context(|| format!("failed to open sample sheet {}", sheet.display()))?;
    let base = sheet.parent().unwrap_or_else(|| Path::new("."));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let mut row: SheetRow =
            record.with_context(|| format!("malformed row in {}", sheet.display()))?;
        if row.path.is_relative() {
            row.path = base.join(&row.path);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn scan_files(rows: &[SheetRow], num_records: usize, num_threads: usize) -> Vec<ScanResult> {
    let pool = threadpool::ThreadPool::new(num_threads);
    let (tx, rx) = channel::bounded::<ScanResult>(rows.len());
    for row in rows {
        let row = row.clone();
        let tx = tx.clone();
        pool.execute(move || {
            let barcode = most_common_barcode(&row.path, num_records);
            tx.send(ScanResult { sample: row.sample, path: row.path, barcode })
                .expect("checkbarcode result channel closed");
        });
    }
    drop(tx);

    let mut progress = Progress::new();
    let bar = progress.bar(rows.len(), "Scanning FASTQ files");
    let mut results = Vec::with_capacity(rows.len());
    for result in rx.iter() {
        results.push(result);
        progress.inc_and_draw(&bar, 1);
    }
    pool.join();
    results
}

/// The barcode is the last colon-separated token of the header's comment
/// field, e.g. `1:N:0:ACGTACGT+TTGCAACT`.
fn barcode_from_header(head: &str) -> Option<&str> {
    let comment = head.split_whitespace().nth(1)?;
    let candidate = comment.rsplit(':').next()?;
    BARCODE_RE.is_match(candidate).then_some(candidate)
}

fn most_common_barcode(path: &Path, num_records: usize) -> Result<String, String> {
    if !path.is_file() {
        return Err("File Not Found".to_string());
    }
    let file = File::open(path).map_err(|_| "Error Reading".to_string())?;
    let reader = match niffler::get_reader(Box::new(file)) {
        Ok((reader, _)) => reader,
        Err(niffler::Error::FileTooShort) => return Err("No Headers/Barcodes Found".to_string()),
        Err(_) => return Err("Error Reading".to_string()),
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut best: Option<(String, usize)> = None;
    let mut fastq = FastqReader::new(reader);
    let mut seen = 0usize;
    while let Some(record) = fastq.next() {
        if seen >= num_records {
            break;
        }
        let record = match record {
            Ok(r) => r,
            Err(_) => return Err("Error Reading".to_string()),
        };
        seen += 1;
        let head = String::from_utf8_lossy(record.head());
        if let Some(barcode) = barcode_from_header(&head) {
            let count = counts.entry(barcode.to_string()).or_insert(0);
            *count += 1;
            // Ties keep the first barcode that reached the count.
            if best.as_ref().map_or(true, |(_, c)| *count > *c) {
                best = Some((barcode.to_string(), *count));
            }
        }
    }
    match best {
        Some((barcode, _)) => Ok(barcode),
        None => Err("No Headers/Barcodes Found".to_string()),
    }
}

/// Compatible when the prefixes agree at every position where neither
/// barcode has an `N`.
fn barcodes_compatible(a: &str, b: &str, prefix_len: usize) -> bool {
    if a.len() < prefix_len || b.len() < prefix_len {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .take(prefix_len)
        .all(|(x, y)| x == b'N' || y == b'N' || x == y)
}

/// Per-sample uniformity over the successfully scanned files.
fn group_uniformity(results: &[ScanResult]) -> HashMap<String, bool> {
    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
    for result in results {
        if let Ok(barcode) = &result.barcode {
            groups.entry(&result.sample).or_default().push(barcode);
        }
    }
    let mut uniform = HashMap::new();
    for (sample, barcodes) in groups {
        let shortest = barcodes.iter().map(|b| b.len()).min().unwrap_or(0);
        let ok = shortest == 0
            || barcodes.len() <= 1
            || barcodes[1..]
                .iter()
                .all(|b| barcodes_compatible(barcodes[0], b, shortest));
        uniform.insert(sample.to_string(), ok);
    }
    uniform
}

fn print_results(
    results: &[ScanResult],
    uniform: &HashMap<String, bool>,
    sheet: &Path,
    num_records: usize,
) {
    let color = ansi::use_color();
    let mut table = Table::new();
    table.set_headers([
        ansi::paint("Sample", ansi::BOLD, color),
        ansi::paint("R1 File", ansi::BOLD, color),
        ansi::paint(
            &format!("Most Common Barcode (first {} records)", num_records),
            ansi::BOLD,
            color,
        ),
    ]);
    for result in results {
        let styled = match &result.barcode {
            Err(status) => ansi::paint(status, ansi::FG_YELLOW, color),
            Ok(barcode) => {
                if uniform.get(&result.sample).copied().unwrap_or(true) {
                    ansi::paint(barcode, ansi::FG_GREEN, color)
                } else {
                    ansi::paint(barcode, ansi::FG_RED, color)
                }
            }
        };
        table.add_row([
            result.sample.clone(),
            result.path.display().to_string(),
            styled,
        ]);
    }
    table.print();
    println!("Processed on {}", sheet.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_barcode_from_header() {
        assert_eq!(
            barcode_from_header("A01234:42:H5WJ7:1:1101:1234:5678 1:N:0:ACGTACGT+TTGCAACT"),
            Some("ACGTACGT+TTGCAACT")
        );
        assert_eq!(barcode_from_header("read_name_without_comment"), None);
        // Non-barcode trailing token is rejected.
        assert_eq!(barcode_from_header("r1 1:N:0:sample7"), None);
    }

    #[test]
    fn test_barcodes_compatible_wildcards() {
        assert!(barcodes_compatible("ACGT", "ACGT", 4));
        assert!(barcodes_compatible("ACNT", "ACGT", 4));
        assert!(!barcodes_compatible("ACGT", "ACCT", 4));
        // Prefix comparison only.
        assert!(barcodes_compatible("ACGTAAAA", "ACGTTTTT", 4));
        assert!(!barcodes_compatible("AC", "ACGT", 4));
    }

    #[test]
    fn test_group_uniformity() {
        let results = vec![
            ScanResult {
                sample: "s1".into(),
                path: PathBuf::from("a"),
                barcode: Ok("ACGTACGT".into()),
            },
            ScanResult {
                sample: "s1".into(),
                path: PathBuf::from("b"),
                barcode: Ok("ACGTACNT".into()),
            },
            ScanResult {
                sample: "s2".into(),
                path: PathBuf::from("c"),
                barcode: Ok("ACGT".into()),
            },
            ScanResult {
                sample: "s2".into(),
                path: PathBuf::from("d"),
                barcode: Ok("TTTT".into()),
            },
            ScanResult {
                sample: "s3".into(),
                path: PathBuf::from("e"),
                barcode: Err("File Not Found".into()),
            },
        ];
        let uniform = group_uniformity(&results);
        assert_eq!(uniform.get("s1"), Some(&true));
        assert_eq!(uniform.get("s2"), Some(&false));
        // Error-only groups have nothing to compare.
        assert_eq!(uniform.get("s3"), None);
    }

    #[test]
    fn test_most_common_barcode_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for i in 0..5 {
            let barcode = if i == 2 { "TTTTTTTT" } else { "ACGTACGT" };
            writeln!(f, "@r{} 1:N:0:{}", i, barcode).unwrap();
            writeln!(f, "ACGT").unwrap();
            writeln!(f, "+").unwrap();
            writeln!(f, "FFFF").unwrap();
        }
        f.flush().unwrap();
        assert_eq!(
            most_common_barcode(f.path(), 100),
            Ok("ACGTACGT".to_string())
        );
    }

    #[test]
    fn test_most_common_barcode_missing_file() {
        assert_eq!(
            most_common_barcode(Path::new("/no/such.fastq"), 10),
            Err("File Not Found".to_string())
        );
    }

    #[test]
    fn test_read_sheet_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("samples.tsv");
        std::fs::write(&sheet, "s1\trun1/a_R1.fastq.gz\ns2\t/abs/b_R1.fastq.gz\n").unwrap();
        let rows = read_sheet(&sheet).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].path, dir.path().join("run1/a_R1.fastq.gz"));
        assert_eq!(rows[1].path, PathBuf::from("/abs/b_R1.fastq.gz"));
    }
}
