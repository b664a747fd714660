//! `tsv`: pretty terminal preview of tab-separated tables.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::utils::ansi;
use crate::utils::open_input;
use crate::utils::Table;

#[derive(Args)]
pub struct TsvCMD {
    /// TSV file to preview, plain or gzip
    #[arg(value_parser)]
    pub path: PathBuf,

    /// Maximum number of data rows to display
    #[arg(short = 'r', long = "rows", default_value = "10")]
    pub max_rows: usize,

    /// Maximum number of columns to display
    #[arg(short = 'c', long = "columns", default_value = "10")]
    pub max_columns: usize,
}

impl TsvCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let reader = open_input(&self.path)?;
        let color = ansi::use_color();
        let preview = preview_rows(reader, self.max_rows)?;

        let header = match preview.header {
            Some(h) => h,
            None => return Ok(()),
        };
        let styled_header: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                format!("{}{}", ansi::paint(name, ansi::FG_BLUE, color), superscript(i + 1))
            })
            .collect();

        let mut table = Table::new();
        table.set_headers(window_columns(&styled_header, self.max_columns));
        for row in &preview.head {
            table.add_row(window_columns(row, self.max_columns));
        }
        if preview.truncated {
            let width = window_columns(&styled_header, self.max_columns).len();
            table.add_row(vec!["..."; width]);
        }
        for row in &preview.tail {
            table.add_row(window_columns(row, self.max_columns));
        }
        table.print();
        Ok(())
    }
}

struct Preview {
    header: Option<Vec<String>>,
    head: Vec<Vec<String>>,
    tail: Vec<Vec<String>>,
    truncated: bool,
}

/// Stream the file once, keeping the first `max_rows/2` (rounded up) data
/// rows and a ring buffer of the last `max_rows/2`. Works on compressed
/// input, unlike seek-from-end tailing.
fn preview_rows(reader: Box<dyn BufRead>, max_rows: usize) -> Result<Preview> {
    let head_count = max_rows / 2 + max_rows % 2;
    let tail_count = max_rows / 2;

    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => Some(split_tsv(&line?)),
        None => None,
    };

    let mut head = Vec::new();
    let mut tail: VecDeque<Vec<String>> = VecDeque::new();
    let mut overflow = 0usize;
    for line in lines {
        let row = split_tsv(&line?);
        if head.len() < head_count {
            head.push(row);
        } else {
            if tail.len() == tail_count.max(1) {
                tail.pop_front();
                overflow += 1;
            }
            if tail_count > 0 {
                tail.push_back(row);
            } else {
                overflow += 1;
            }
        }
    }
    Ok(Preview {
        header,
        head,
        truncated: overflow > 0,
        tail: tail.into_iter().collect(),
    })
}

fn split_tsv(line: &str) -> Vec<String> {
    line.split('\t').map(|s| s.to_string()).collect()
}

/// Keep the first and last columns when there are too many, with a `...`
/// column in the middle.
fn window_columns(fields: &[String], max_columns: usize) -> Vec<String> {
    if fields.len() <= max_columns {
        return fields.to_vec();
    }
    let half = max_columns / 2;
    let first = half + max_columns % 2;
    let mut out: Vec<String> = fields[..first].to_vec();
    out.push("...".to_string());
    out.extend_from_slice(&fields[fields.len() - half..]);
    out
}

/// 1-based column index rendered as superscript digits.
fn superscript(mut num: usize) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    if num == 0 {
        return DIGITS[0].to_string();
    }
    let mut out = Vec::new();
    while num > 0 {
        out.push(DIGITS[num % 10]);
        num /= 10;
    }
    out.iter().rev().collect()
}
