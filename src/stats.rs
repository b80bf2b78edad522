//! Run statistics: how the modes ended and how much of the corpus the crack
//! log now covers.
use std::collections::HashSet;

use crate::crack_log::CrackLog;
use crate::engine::{ModeOutcome, RunSummary};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub modes_total: usize,
    pub modes_skipped: usize,
    pub modes_not_found: usize,
    pub modes_found: usize,
    /// `(hash, mode)` pairs cracked in this run.
    pub pairs_cracked: usize,
    /// Distinct hashes cracked in this run, under any mode.
    pub hashes_cracked: usize,
    /// Distinct corpus hashes.
    pub corpus_unique: usize,
    /// Distinct corpus hashes with at least one log entry, under any mode.
    pub corpus_covered: usize,
    pub corpus_covered_percentage: String,
}

pub(crate) fn pct(n: usize, d: usize) -> String {
    if d == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (n as f64) / (d as f64) * 100.0)
}

pub fn calculate_run_stats(summary: &RunSummary, hashes: &[String], log: &CrackLog) -> RunStats {
    let mut stats = RunStats {
        modes_total: summary.reports.len(),
        ..RunStats::default()
    };
    let mut cracked_now: HashSet<&str> = HashSet::new();
    for r in &summary.reports {
        match &r.outcome {
            ModeOutcome::Skipped => stats.modes_skipped += 1,
            ModeOutcome::NotFound => stats.modes_not_found += 1,
            ModeOutcome::Found(c) => {
                stats.modes_found += 1;
                stats.pairs_cracked += c.len();
                cracked_now.extend(c.iter().map(|c| c.hash.as_str()));
            }
        }
    }
    stats.hashes_cracked = cracked_now.len();

    let unique: HashSet<&str> = hashes.iter().map(String::as_str).collect();
    let logged: HashSet<&str> = log.entries().iter().map(|e| e.hash.as_str()).collect();
    stats.corpus_unique = unique.len();
    stats.corpus_covered = unique.intersection(&logged).count();
    stats.corpus_covered_percentage = pct(stats.corpus_covered, stats.corpus_unique);
    stats
}

/// Latest cleartext per distinct hash across the whole log, sorted by hash.
pub fn cleartext_by_hash(log: &CrackLog) -> Vec<(String, String)> {
    let mut map: std::collections::BTreeMap<&str, &str> = std::collections::BTreeMap::new();
    for e in log.entries() {
        map.insert(e.hash.as_str(), e.clear.as_str());
    }
    map.into_iter()
        .map(|(h, c)| (h.to_string(), c.to_string()))
        .collect()
}
