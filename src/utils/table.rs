//! Unicode box table rendering for the preview-style subcommands.
//!
//! Cells may contain ANSI styling; widths are computed on the visible
//! characters only.

use std::fmt::Write;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Visible width of a cell, with SGR escape sequences stripped.
fn display_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }
    width
}

impl Table {
    pub fn new() -> Table {
        Table { headers: Vec::new(), rows: Vec::new() }
    }

    pub fn set_headers<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(|h| h.into()).collect();
    }

    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(|c| c.into()).collect());
    }

    fn column_widths(&self) -> Vec<usize> {
        let ncols = self
            .rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; ncols];
        for (i, h) in self.headers.iter().enumerate() {
            widths[i] = widths[i].max(display_width(h));
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(display_width(cell));
            }
        }
        widths
    }

    fn write_divider(out: &mut String, widths: &[usize], left: char, mid: char, right: char) {
        out.push(left);
        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                out.push(mid);
            }
            for _ in 0..w + 2 {
                out.push('─');
            }
        }
        out.push(right);
        out.push('\n');
    }

    fn write_row(out: &mut String, widths: &[usize], cells: &[String]) {
        out.push('│');
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(|s| s.as_str()).unwrap_or("");
            let pad = w - display_width(cell);
            let _ = write!(out, " {}{} │", cell, " ".repeat(pad));
        }
        out.push('\n');
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        if widths.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        Self::write_divider(&mut out, &widths, '╭', '┬', '╮');
        if !self.headers.is_empty() {
            Self::write_row(&mut out, &widths, &self.headers);
            Self::write_divider(&mut out, &widths, '├', '┼', '┤');
        }
        for row in &self.rows {
            Self::write_row(&mut out, &widths, row);
        }
        Self::write_divider(&mut out, &widths, '╰', '┴', '╯');
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}
