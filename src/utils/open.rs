//! Input opening with transparent compression handling.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::Context;

/// Open `path` for reading, decompressing on the fly when the content is
/// gzip (detected from magic bytes, not the file name). `-` means stdin,
/// which is always treated as plain text.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = match niffler::get_reader(Box::new(file)) {
        Ok((reader, _format)) => reader,
        // Too short to sniff means too short to contain records.
        Err(niffler::Error::FileTooShort) => Box::new(std::io::empty()),
        Err(e) => {
            anyhow::bail!("failed to read {}: {}", path.display(), e);
        }
    };
    Ok(Box::new(BufReader::new(reader)))
}
