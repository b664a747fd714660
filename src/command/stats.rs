//! `stats`: merge two-column count files into one matrix.
//!
//! Each input contributes a `key<SEP>value` column; keys become rows in
//! first-seen order across all files, file names become column headers,
//! and missing cells render as `N/A`. Numeric values are grouped with
//! thousands separators by default, or scaled to `k`/`M` units.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::utils::ansi;
use crate::utils::open_input;
use crate::utils::Table;

#[derive(Args)]
pub struct StatsCMD {
    /// Two-column files to merge; `-` for stdin, gzip transparent
    #[arg(value_parser, required = true)]
    pub paths: Vec<PathBuf>,

    /// Column separator
    #[arg(short = 's', long = "separator", default_value = "\t")]
    pub separator: String,

    /// Scale numeric values to thousands (suffix `k`)
    #[arg(short = 'k', long = "per-thousand", default_value = "false")]
    pub per_thousand: bool,

    /// Scale numeric values to millions (suffix `M`)
    #[arg(short = 'm', long = "per-million", default_value = "false")]
    pub per_million: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Grouped,
    Thousand,
    Million,
}

impl StatsCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        if self.per_thousand && self.per_million {
            anyhow::bail!("cannot use --per-thousand and --per-million together");
        }
        let scale = if self.per_thousand {
            Scale::Thousand
        } else if self.per_million {
            Scale::Million
        } else {
            Scale::Grouped
        };

        let mut matrix = Matrix::new();
        for path in &self.paths {
            let reader = open_input(path)?;
            matrix.add_file(&path.display().to_string(), reader, &self.separator, scale)?;
        }
        matrix.print(ansi::use_color());
        Ok(())
    }
}

/// Row keys in first-seen order against one value column per file.
struct Matrix {
    files: Vec<String>,
    columns: Vec<HashMap<String, String>>,
    row_keys: Vec<String>,
}

impl Matrix {
    fn new() -> Matrix {
        Matrix { files: Vec::new(), columns: Vec::new(), row_keys: Vec::new() }
    }

    fn add_file<R: BufRead>(
        &mut self,
        name: &str,
        reader: R,
        separator: &str,
        scale: Scale,
    ) -> Result<()> {
        let mut column = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let mut fields = line.split(separator);
            let (key, value) = match (fields.next(), fields.next()) {
                (Some(k), Some(v)) => (k, v),
                // Lines without both columns carry no data point.
                _ => continue,
            };
            if !column.contains_key(key) && !self.row_keys.iter().any(|k| k == key) {
                self.row_keys.push(key.to_string());
            }
            column.insert(key.to_string(), format_value(value, scale));
        }
        self.files.push(name.to_string());
        self.columns.push(column);
        Ok(())
    }

    fn print(&self, color: bool) {
        let mut table = Table::new();
        let mut headers = vec![String::new()];
        headers.extend(
            self.files
                .iter()
                .map(|f| ansi::paint(f, ansi::FG_BLUE, color)),
        );
        table.set_headers(headers);

        for key in &self.row_keys {
            let mut row = vec![key.clone()];
            for column in &self.columns {
                match column.get(key) {
                    Some(value) => row.push(ansi::paint(value, ansi::FG_GREEN, color)),
                    None => row.push("N/A".to_string()),
                }
            }
            table.add_row(row);
        }
        table.print();
    }
}

fn format_value(raw: &str, scale: Scale) -> String {
    match raw.trim().parse::<f64>() {
        Ok(num) => match scale {
            Scale::Thousand => format!("{:.1}k", num / 1e3),
            Scale::Million => format!("{:.1}M", num / 1e6),
            Scale::Grouped => group_thousands(num as i64),
        },
        Err(_) => raw.to_string(),
    }
}

fn group_thousands(num: i64) -> String {
    let sign = if num < 0 { "-" } else { "" };
    let digits = num.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{}{}", sign, out)
}
