//! Engine: walks the candidate modes one at a time, attacking only the
//! hashes the crack log has not yet recorded for each mode, and appends
//! every recovered pair to the log before moving on.
//!
//! Per mode the engine either skips (nothing pending), reports not-found,
//! or extracts and logs what was cracked. The mode's temp files are gone
//! before the next mode starts, whichever way it ended.
//!
//! ```no_run
//! use autocrack::{crack_log::CrackLog, engine::Engine, tool::{CrackTool, Hashcat}};
//! # fn main() -> anyhow::Result<()> {
//! let tool = Hashcat::default();
//! let modes = tool.enumerate("hashes.txt".as_ref())?;
//! let hashes = autocrack::corpus::load_hashes("hashes.txt", u64::MAX)?;
//! let mut log = CrackLog::load("crack_log.json");
//! let mut engine = Engine::new(&tool, &mut log, "rockyou.txt");
//! let summary = engine.run(&hashes, &modes, |_| {})?;
//! println!("{}", autocrack::report::render_summary(&summary, &hashes, &log));
//! # Ok(())
//! # }
//! ```
use std::path::PathBuf;

use anyhow::Result;

use crate::attempt::AttemptRunner;
use crate::crack_log::{CrackLog, LogEntry};
use crate::interrupt;
use crate::mode::Mode;
use crate::pending::pending_hashes;
use crate::tool::CrackTool;

/// Returned when Ctrl-C arrives during a mode.
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// A hash recovered under a mode during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackedHash {
    pub hash: String,
    pub clear: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// Every hash was already logged for this mode; the tool was not run.
    Skipped,
    /// The attack ran and cracked nothing.
    NotFound,
    /// The attack cracked these hashes, all of which are now logged.
    Found(Vec<CrackedHash>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeReport {
    pub mode: Mode,
    pub pending: usize,
    pub outcome: ModeOutcome,
}

impl ModeReport {
    pub fn cracked(&self) -> &[CrackedHash] {
        match &self.outcome {
            ModeOutcome::Found(c) => c,
            _ => &[],
        }
    }
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum Progress<'a> {
    Starting { mode: &'a Mode, pending: usize },
    Finished(&'a ModeReport),
}

/// Per-mode reports for one run, in mode order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<ModeReport>,
}

impl RunSummary {
    /// Modes that cracked something in this run.
    pub fn found(&self) -> impl Iterator<Item = &ModeReport> {
        self.reports
            .iter()
            .filter(|r| !r.cracked().is_empty())
    }

    /// Total `(hash, mode)` pairs cracked in this run.
    pub fn cracked_count(&self) -> usize {
        self.reports.iter().map(|r| r.cracked().len()).sum()
    }
}

pub struct Engine<'a, T: CrackTool> {
    runner: AttemptRunner<'a, T>,
    log: &'a mut CrackLog,
    interrupted: fn() -> bool,
}

impl<'a, T: CrackTool> Engine<'a, T> {
    /// Engine placing temp files in the system temp directory.
    pub fn new(tool: &'a T, log: &'a mut CrackLog, wordlist: impl Into<PathBuf>) -> Self {
        Self::with_temp_dir(tool, log, wordlist, std::env::temp_dir())
    }

    pub fn with_temp_dir(
        tool: &'a T,
        log: &'a mut CrackLog,
        wordlist: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner: AttemptRunner::new(tool, wordlist, temp_dir),
            log,
            interrupted: interrupt::requested,
        }
    }

    /// Replace the Ctrl-C check consulted before each mode's attack and
    /// after its results are logged.
    pub fn with_interrupt_check(mut self, check: fn() -> bool) -> Self {
        self.interrupted = check;
        self
    }

    pub fn log(&self) -> &CrackLog {
        &*self.log
    }

    fn check_interrupt(&self) -> Result<()> {
        if (self.interrupted)() {
            return Err(Interrupted.into());
        }
        Ok(())
    }

    /// Process a single mode against `hashes`.
    pub fn process_mode(&mut self, hashes: &[String], mode: &Mode) -> Result<ModeReport> {
        self.process_mode_with(hashes, mode, &mut |_| {})
    }

    fn process_mode_with(
        &mut self,
        hashes: &[String],
        mode: &Mode,
        on_progress: &mut dyn FnMut(Progress<'_>),
    ) -> Result<ModeReport> {
        self.check_interrupt()?;
        let pending = pending_hashes(hashes, &mode.id, &*self.log);
        if pending.is_empty() {
            log::info!("mode {}: no new hashes, skipping", mode);
            return Ok(ModeReport {
                mode: mode.clone(),
                pending: 0,
                outcome: ModeOutcome::Skipped,
            });
        }
        on_progress(Progress::Starting {
            mode,
            pending: pending.len(),
        });
        log::info!("mode {}: attacking {} pending hash(es)", mode, pending.len());

        let attempt = self.runner.run(&mode.id, &pending)?;
        // Whatever the store holds is logged before an interrupt is honoured.
        let outcome = if attempt.cracked {
            let pairs = self.runner.extract(&attempt, &pending)?;
            let mut cracked = Vec::with_capacity(pairs.len());
            for (hash, clear) in pairs {
                self.log.append(LogEntry::now(&hash, &mode.id, &clear))?;
                cracked.push(CrackedHash { hash, clear });
            }
            if cracked.is_empty() {
                log::warn!(
                    "mode {}: tool reported success but showed no pending hashes",
                    mode
                );
            }
            ModeOutcome::Found(cracked)
        } else {
            ModeOutcome::NotFound
        };
        if let Err(e) = attempt.artifacts.cleanup() {
            log::warn!("mode {}: {:#}", mode, e);
        }
        self.check_interrupt()?;

        Ok(ModeReport {
            mode: mode.clone(),
            pending: pending.len(),
            outcome,
        })
    }

    /// Process every mode in order, reporting progress through `on_progress`.
    /// Stops at the first error; everything logged so far stays logged.
    pub fn run<F>(
        &mut self,
        hashes: &[String],
        modes: &[Mode],
        mut on_progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(Progress<'_>),
    {
        let mut summary = RunSummary::default();
        for mode in modes {
            let report = self.process_mode_with(hashes, mode, &mut on_progress)?;
            on_progress(Progress::Finished(&report));
            summary.reports.push(report);
        }
        Ok(summary)
    }
}
