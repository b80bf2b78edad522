use std::path::Path;

use anyhow::Result;

use crate::io::read_lines;

/// Lines starting with this marker are comments, not hashes.
pub const COMMENT_MARKER: char = '#';

/// Return the hash on `line`, or `None` for blank and comment lines.
pub fn parse_hash_line(line: &str) -> Option<&str> {
    let h = line.trim();
    if h.is_empty() || h.starts_with(COMMENT_MARKER) {
        None
    } else {
        Some(h)
    }
}

/// Parse an in-memory corpus. Order and duplicates are preserved.
pub fn parse_hashes(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(parse_hash_line)
        .map(str::to_string)
        .collect()
}

/// Stream a corpus file into an ordered list of hashes.
pub fn load_hashes<P: AsRef<Path>>(path: P, mmap_threshold_bytes: u64) -> Result<Vec<String>> {
    let mut hashes = Vec::new();
    for line in read_lines(&path, mmap_threshold_bytes)? {
        let line = line?;
        if let Some(h) = parse_hash_line(&line) {
            hashes.push(h.to_string());
        }
    }
    log::debug!(
        "loaded {} hash line(s) from {}",
        hashes.len(),
        path.as_ref().display()
    );
    Ok(hashes)
}
