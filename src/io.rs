//! Line readers for corpus files.
//!
//! Small corpora go through a `BufReader`; anything at or above the mmap
//! threshold is mapped and scanned for newlines with `memchr`. Both readers
//! strip a trailing `\r` and decode lossily, so a stray non-UTF-8 byte in a
//! hash dump never aborts a run.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Corpus size in bytes at which we switch to mmap.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

fn buffered_lines<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mut reader = BufReader::new(file);
    let lines = std::iter::from_fn(move || {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                }
                Some(Ok(decode_line(&buf)))
            }
            Err(e) => Some(Err(e)),
        }
    });
    Ok(Box::new(lines))
}

fn mapped_lines<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    // The corpus is only read; concurrent truncation by another process is
    // outside what we guard against.
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(Box::new(MappedLines { mmap, pos: 0 }))
}

struct MappedLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MappedLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        let end = match memchr::memchr(b'\n', &data[start..]) {
            Some(off) => start + off,
            None => data.len(),
        };
        self.pos = end + 1;
        Some(Ok(decode_line(&data[start..end])))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let slice = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(slice).into_owned()
}

/// Open `path` for line iteration, mapping it when it is at least
/// `threshold_bytes` long.
pub fn read_lines<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        mapped_lines(path)
    } else {
        buffered_lines(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn collect(path: &Path, threshold: u64) -> Vec<String> {
        read_lines(path, threshold)
            .unwrap()
            .map(|l| l.unwrap())
            .collect()
    }

    #[test]
    fn both_readers_agree_on_crlf_and_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        fs::write(&path, b"aaa\r\nbbb\n\nccc").unwrap();
        let buffered = collect(&path, u64::MAX);
        let mapped = collect(&path, 1);
        assert_eq!(buffered, vec!["aaa", "bbb", "", "ccc"]);
        assert_eq!(buffered, mapped);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        fs::write(&path, b"ab\xffcd\n").unwrap();
        let lines = collect(&path, u64::MAX);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ab"));
        assert!(lines[0].ends_with("cd"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = match read_lines("/definitely/not/here.txt", 0) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(format!("{err:#}").contains("/definitely/not/here.txt"));
    }
}
