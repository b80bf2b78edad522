//! Human-readable output for terminal use.
//!
//! Per-mode progress lines are rendered piecewise so the CLI can print the
//! mode label before a long attack and the verdict after it. The final
//! summary lists only what was cracked in this run, followed by statistics.
use colored::*;

use crate::{
    crack_log::CrackLog,
    engine::{ModeOutcome, ModeReport, RunSummary},
    mode::Mode,
    stats::calculate_run_stats,
};

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

pub fn render_candidates(modes: &[Mode]) -> String {
    let mut out = format!("→ Found {} candidate mode(s):\n", modes.len());
    for m in modes {
        out.push_str(&format!("   • {}  ({})\n", m.id.bold(), m.name));
    }
    out
}

/// Label printed before a mode's attack starts.
pub fn render_mode_label(mode: &Mode) -> String {
    format!("→ Mode {:<6} ({}) … ", mode.id, mode.name)
}

fn render_pair(hash: &str, clear: &str) -> String {
    format!("    {} → '{}'", hash, clear)
}

/// Verdict printed once a mode has finished. Skipped modes never printed a
/// label, so their line carries it.
pub fn render_mode_result(report: &ModeReport) -> String {
    match &report.outcome {
        ModeOutcome::Skipped => format!(
            "{}{} no new hashes for this mode",
            render_mode_label(&report.mode),
            "[SKIPPED]".yellow()
        ),
        ModeOutcome::NotFound => "[NOT FOUND]".dimmed().to_string(),
        ModeOutcome::Found(cracked) => {
            let mut lines = vec!["[FOUND]".green().bold().to_string()];
            for c in cracked {
                lines.push(render_pair(&c.hash, &c.clear));
            }
            lines.join("\n")
        }
    }
}

/// One mode's block in the final summary.
pub fn render_found_block(report: &ModeReport) -> String {
    let cracked = report.cracked();
    let mut lines = vec![format!(
        "→ Mode {} ({}) cracked {} hash(es):",
        report.mode.id.bold(),
        report.mode.name,
        cracked.len()
    )];
    for c in cracked {
        lines.push(render_pair(&c.hash, &c.clear.red().to_string()));
    }
    lines.join("\n")
}

pub fn render_summary(summary: &RunSummary, hashes: &[String], log: &CrackLog) -> String {
    let mut out = String::new();
    out.push_str(&section_header(
        &"Summary of Modes That Cracked Something"
            .bold()
            .cyan()
            .to_string(),
    ));
    let mut any = false;
    for report in summary.found() {
        any = true;
        out.push_str(&render_found_block(report));
        out.push_str("\n\n");
    }
    if !any {
        out.push_str("No modes cracked any new hashes. Check your wordlist and/or hash file.\n");
    }

    let stats = calculate_run_stats(summary, hashes, log);
    out.push_str(&section_header(&"Run Statistics".bold().yellow().to_string()));
    let lines = [
        format!(
            "Modes: {} (found {}, not found {}, skipped {})",
            stats.modes_total, stats.modes_found, stats.modes_not_found, stats.modes_skipped
        ),
        format!(
            "Cracked this run: {} pair(s), {} distinct hash(es)",
            stats.pairs_cracked, stats.hashes_cracked
        ),
        format!(
            "Corpus coverage: {}/{} ({})",
            stats.corpus_covered, stats.corpus_unique, stats.corpus_covered_percentage
        ),
        format!("Crack log entries: {}", log.len()),
    ];
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
