//! `wc`: line/word/character counting with gzip support.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::utils::open_input;

#[derive(Args)]
pub struct WcCMD {
    /// Files to count; gzip handled transparently, directories skipped
    #[arg(value_parser, required = true)]
    pub paths: Vec<PathBuf>,

    /// Count the number of lines
    #[arg(short = 'l', long = "lines", default_value = "false")]
    pub lines: bool,

    /// Count the number of words
    #[arg(short = 'w', long = "words", default_value = "false")]
    pub words: bool,

    /// Count the number of characters
    #[arg(short = 'c', long = "chars", default_value = "false")]
    pub chars: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Counts {
    lines: usize,
    words: usize,
    chars: usize,
}

impl WcCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        // No flags means lines.
        let want_lines = self.lines || (!self.words && !self.chars);
        for path in &self.paths {
            if path.is_dir() {
                println!("skipping directory: {}", path.display());
                continue;
            }
            let reader = match open_input(path) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("{:#}", e);
                    continue;
                }
            };
            let counts = count(reader)?;
            let mut fields = vec![format!("{}", path.display())];
            if want_lines {
                fields.push(format!("Lines: {}", counts.lines));
            }
            if self.words {
                fields.push(format!("Words: {}", counts.words));
            }
            if self.chars {
                fields.push(format!("Chars: {}", counts.chars));
            }
            println!("{}", fields.join("\t"));
        }
        Ok(())
    }
}

fn count(reader: Box<dyn BufRead>) -> Result<Counts> {
    let mut counts = Counts::default();
    for line in reader.lines() {
        let line = line?;
        counts.lines += 1;
        counts.words += line.split_whitespace().count();
        counts.chars += line.chars().count();
    }
    Ok(counts)
}
