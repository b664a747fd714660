//! `colname`: transpose a table header against its first data rows.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::utils::open_input;
use crate::utils::Table;

#[derive(Args)]
pub struct ColnameCMD {
    /// Table file, plain or gzip; defaults to stdin
    #[arg(value_parser, default_value = "-")]
    pub path: PathBuf,
}

impl ColnameCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let reader = open_input(&self.path)?;
        let rows = transpose_preview(reader)?;
        let mut table = Table::new();
        table.set_headers(["index", "name", "1st", "2nd"]);
        for row in rows {
            table.add_row(row);
        }
        table.print();
        Ok(())
    }
}

/// One output row per column: 1-based index, column name, and the values
/// from the first two data rows (when present).
fn transpose_preview(reader: Box<dyn BufRead>) -> Result<Vec<Vec<String>>> {
    let mut lines = reader.lines();
    let mut out: Vec<Vec<String>> = match lines.next() {
        Some(header) => header?
            .split('\t')
            .enumerate()
            .map(|(i, name)| vec![(i + 1).to_string(), name.to_string()])
            .collect(),
        None => return Ok(Vec::new()),
    };

    for line in lines.take(2) {
        let line = line?;
        for (col, value) in line.split('\t').enumerate().take(out.len()) {
            out[col].push(value.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_transpose() {
        let data = "id\tcount\tgene\nr1\t10\tTP53\nr2\t20\tBRCA1\nr3\t30\tEGFR\n";
        let rows = transpose_preview(Box::new(Cursor::new(data))).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["1", "id", "r1", "r2"]);
        assert_eq!(rows[1], vec!["2", "count", "10", "20"]);
        assert_eq!(rows[2], vec!["3", "gene", "TP53", "BRCA1"]);
    }

    #[test]
    fn test_transpose_single_header_line() {
        let rows = transpose_preview(Box::new(Cursor::new("a\tb\n"))).unwrap();
        assert_eq!(rows, vec![vec!["1", "a"], vec!["2", "b"]]);
    }

    #[test]
    fn test_transpose_ragged_row() {
        let data = "a\tb\tc\n1\t2\n";
        let rows = transpose_preview(Box::new(Cursor::new(data))).unwrap();
        assert_eq!(rows[2], vec!["3", "c"]);
    }

    #[test]
    fn test_transpose_empty() {
        assert!(transpose_preview(Box::new(Cursor::new("")))
            .unwrap()
            .is_empty());
    }
}
