//! Export helpers for writing results to CSV and plain text files.
//!
//! - `save_cracked_csv` writes one row per `(hash, mode)` pair cracked in
//!   this run.
//! - `save_hash_clear_txt` writes `hash:cleartext` for every distinct hash
//!   in the crack log, ready to be fed back into other tooling.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use csv::Writer;

use crate::{crack_log::CrackLog, engine::RunSummary, stats::cleartext_by_hash};

pub fn save_cracked_csv<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(["Hash", "Mode", "Mode Name", "Cleartext"])?;
    for report in summary.found() {
        for c in report.cracked() {
            wtr.write_record([
                c.hash.as_str(),
                report.mode.id.as_str(),
                report.mode.name.as_str(),
                c.clear.as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_hash_clear_txt<P: AsRef<Path>>(log: &CrackLog, path: P) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    for (hash, clear) in cleartext_by_hash(log) {
        writeln!(f, "{}:{}", hash, clear)?;
    }
    f.flush()?;
    Ok(())
}
