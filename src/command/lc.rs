//! `lc`: newline counting with a fixed worker pool.
//!
//! Workers share the file handle behind a mutex and take turns pulling
//! chunks; counting happens outside the lock so readers overlap with the
//! byte scan.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Args;
use crossbeam::channel;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Args)]
pub struct LcCMD {
    /// File to count newlines in
    #[arg(value_parser)]
    pub path: PathBuf,

    /// Number of worker threads
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    pub num_threads: Option<usize>,
}

impl LcCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let num_threads = self
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()));
        let total = count_newlines(file, num_threads)?;
        println!("{} {}", self.path.display(), total);
        Ok(())
    }
}

fn count_chunk(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == b'\n').count()
}

fn count_newlines(file: File, num_threads: usize) -> Result<usize> {
    let file = Arc::new(Mutex::new(file));
    let pool = threadpool::ThreadPool::new(num_threads.max(1));
    let (tx, rx) = channel::bounded::<usize>(num_threads.max(1));

    for _ in 0..num_threads.max(1) {
        let file = Arc::clone(&file);
        let tx = tx.clone();
        pool.execute(move || {
            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut local = 0usize;
            loop {
                let n = {
                    let mut file = file.lock().expect("lc reader lock poisoned");
                    match file.read(&mut buf) {
                        Ok(n) => n,
                        Err(e) => {
                            log::error!("read error: {}", e);
                            break;
                        }
                    }
                };
                if n == 0 {
                    break;
                }
                local += count_chunk(&buf[..n]);
            }
            tx.send(local).expect("lc result channel closed");
        });
    }
    drop(tx);

    let total = rx.iter().sum();
    pool.join();
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_count_chunk() {
        assert_eq!(count_chunk(b"a\nb\nc\n"), 3);
        assert_eq!(count_chunk(b"no newline"), 0);
        assert_eq!(count_chunk(b""), 0);
    }

    #[test]
    fn test_count_newlines_parallel() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for i in 0..10_000 {
            writeln!(f, "line {}", i).unwrap();
        }
        f.flush().unwrap();
        let file = f.reopen().unwrap();
        assert_eq!(count_newlines(file, 4).unwrap(), 10_000);
    }

    #[test]
    fn test_count_newlines_single_thread() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "a\nb\n").unwrap();
        f.flush().unwrap();
        assert_eq!(count_newlines(f.reopen().unwrap(), 1).unwrap(), 2);
    }
}
