//! Hash-mode classifications and the parser for the tool's candidate table.
//!
//! The enumeration output mixes a banner and help text with data rows of the
//! shape `<id> | <name> | <category>`. Only rows matching that shape are
//! kept, in the order the tool printed them.
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A hash-type classification reported by the cracking tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mode {
    pub id: String,
    pub name: String,
}

impl Mode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModeError {
    #[error("not a mode table row: {0}")]
    NotARow(String),
}

fn row_pattern() -> &'static Regex {
    static ROW: OnceLock<Regex> = OnceLock::new();
    ROW.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*\|\s*(.+?)\s*\|\s*(.+)$").expect("mode row regex is valid")
    })
}

pub fn parse_mode_row(line: &str) -> Result<Mode, ModeError> {
    let caps = row_pattern()
        .captures(line)
        .ok_or_else(|| ModeError::NotARow(line.to_string()))?;
    Ok(Mode::new(caps[1].trim(), caps[2].trim()))
}

/// Parse the whole enumeration stdout; non-row lines are skipped.
pub fn parse_mode_table(stdout: &str) -> Vec<Mode> {
    let mut modes = Vec::new();
    let mut skipped = 0usize;
    for line in stdout.lines() {
        match parse_mode_row(line) {
            Ok(m) => modes.push(m),
            Err(_) => skipped += 1,
        }
    }
    log::debug!(
        "mode table: {} row(s), {} non-row line(s) skipped",
        modes.len(),
        skipped
    );
    modes
}
