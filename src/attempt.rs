//! One isolated attack per mode.
//!
//! Each attempt owns two temp files: the subset of pending hashes and a
//! fresh result store (potfile) that no other mode ever sees. Both live in
//! [`AttemptArtifacts`] and are removed when it is dropped, which covers the
//! error and interrupt paths as well as the normal one.
use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::{Builder, TempPath};

use crate::tool::{AttemptRequest, CrackTool};

const SUBSET_PREFIX: &str = "hc_subset_";
const STORE_PREFIX: &str = "hc_pot_";

/// Per-mode temp files; removed on drop.
#[derive(Debug)]
pub struct AttemptArtifacts {
    subset: TempPath,
    store: TempPath,
}

impl AttemptArtifacts {
    /// Write `pending` (one hash per line) to a new subset file and allocate
    /// an empty result store, both inside `dir`.
    pub fn create(pending: &[&str], dir: &Path) -> Result<Self> {
        let subset = Builder::new()
            .prefix(SUBSET_PREFIX)
            .suffix(".txt")
            .tempfile_in(dir)
            .with_context(|| format!("create subset file in {}", dir.display()))?;
        {
            let mut w = BufWriter::new(subset.as_file());
            for h in pending {
                writeln!(w, "{}", h)?;
            }
            w.flush()
                .with_context(|| format!("write subset file {}", subset.path().display()))?;
        }
        let subset = subset.into_temp_path();

        let store = Builder::new()
            .prefix(STORE_PREFIX)
            .suffix(".pot")
            .tempfile_in(dir)
            .with_context(|| format!("create result store in {}", dir.display()))?
            .into_temp_path();

        log::debug!(
            "artifacts: subset={} store={}",
            subset.display(),
            store.display()
        );
        Ok(Self { subset, store })
    }

    pub fn subset_path(&self) -> &Path {
        &self.subset
    }

    pub fn store_path(&self) -> &Path {
        &self.store
    }

    /// Remove both files now, reporting failures instead of ignoring them.
    pub fn cleanup(self) -> Result<()> {
        let Self { subset, store } = self;
        let subset_res = subset.close().context("remove subset file");
        let store_res = store.close().context("remove result store");
        subset_res.and(store_res)
    }
}

/// Runs attacks for one wordlist, placing artifacts in `temp_dir`.
#[derive(Debug)]
pub struct AttemptRunner<'t, T: CrackTool> {
    tool: &'t T,
    wordlist: PathBuf,
    temp_dir: PathBuf,
}

/// A finished attack; the artifacts stay alive until this is dropped so
/// the store can still be queried.
#[derive(Debug)]
pub struct Attempt {
    pub mode_id: String,
    pub cracked: bool,
    pub artifacts: AttemptArtifacts,
}

impl<'t, T: CrackTool> AttemptRunner<'t, T> {
    pub fn new(tool: &'t T, wordlist: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            wordlist: wordlist.into(),
            temp_dir: temp_dir.into(),
        }
    }

    fn request<'a>(
        &'a self,
        mode_id: &'a str,
        artifacts: &'a AttemptArtifacts,
    ) -> AttemptRequest<'a> {
        AttemptRequest {
            mode_id,
            subset: artifacts.subset_path(),
            wordlist: &self.wordlist,
            store: artifacts.store_path(),
        }
    }

    /// Attack `pending` under `mode_id`. If the tool call fails, the
    /// artifacts are dropped (and removed) before the error is returned.
    pub fn run(&self, mode_id: &str, pending: &[&str]) -> Result<Attempt> {
        let artifacts = AttemptArtifacts::create(pending, &self.temp_dir)?;
        let cracked = self
            .tool
            .attempt(&self.request(mode_id, &artifacts))
            .with_context(|| format!("attack under mode {}", mode_id))?;
        Ok(Attempt {
            mode_id: mode_id.to_string(),
            cracked,
            artifacts,
        })
    }

    /// Query the attempt's store for what it cracked, restricted to
    /// `pending`.
    pub fn extract(&self, attempt: &Attempt, pending: &[&str]) -> Result<Vec<(String, String)>> {
        let shown = self
            .tool
            .show(&self.request(&attempt.mode_id, &attempt.artifacts))
            .with_context(|| format!("show results for mode {}", attempt.mode_id))?;
        Ok(extract_cracked(shown, pending))
    }
}

/// Attribute shown `(hash, cleartext)` pairs to pending hashes.
///
/// A pair whose hash is pending is kept as-is. Otherwise the original line
/// is rebuilt and matched against the longest pending hash `p` it starts
/// with as `p:`, which handles formats whose hash field itself contains
/// colons. Pairs matching no pending hash are dropped. Each hash is reported
/// once, at its first occurrence.
pub fn extract_cracked(shown: Vec<(String, String)>, pending: &[&str]) -> Vec<(String, String)> {
    let pending_set: HashSet<&str> = pending.iter().copied().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (hash, clear) in shown {
        let pair = if pending_set.contains(hash.as_str()) {
            Some((hash, clear))
        } else {
            let line = format!("{}:{}", hash, clear);
            longest_pending_prefix(&line, pending)
                .map(|p| (p.to_string(), line[p.len() + 1..].to_string()))
        };
        match pair {
            Some((h, c)) => {
                if seen.insert(h.clone()) {
                    out.push((h, c));
                }
            }
            None => log::debug!("dropping result for a hash outside the subset"),
        }
    }
    out
}

fn longest_pending_prefix<'p>(line: &str, pending: &[&'p str]) -> Option<&'p str> {
    pending
        .iter()
        .copied()
        .filter(|p| {
            line.len() > p.len() && line.starts_with(p) && line.as_bytes()[p.len()] == b':'
        })
        .max_by_key(|p| p.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::tool::ToolError;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn pair(h: &str, c: &str) -> (String, String) {
        (h.to_string(), c.to_string())
    }

    #[test]
    fn artifacts_hold_pending_lines_and_vanish_on_drop() {
        let dir = tempdir().unwrap();
        let a = AttemptArtifacts::create(&["h1", "h2", "h1"], dir.path()).unwrap();
        let subset = a.subset_path().to_path_buf();
        let store = a.store_path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&subset).unwrap(), "h1\nh2\nh1\n");
        assert!(store.exists());
        assert_ne!(subset, store);
        drop(a);
        assert!(!subset.exists());
        assert!(!store.exists());
    }

    #[test]
    fn explicit_cleanup_removes_files() {
        let dir = tempdir().unwrap();
        let a = AttemptArtifacts::create(&["h"], dir.path()).unwrap();
        let subset = a.subset_path().to_path_buf();
        a.cleanup().unwrap();
        assert!(!subset.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn extraction_keeps_only_pending_hashes() {
        let shown = vec![pair("a", "pw"), pair("zzz", "other"), pair("b", "x:y")];
        let got = extract_cracked(shown, &["a", "b", "c"]);
        assert_eq!(got, vec![pair("a", "pw"), pair("b", "x:y")]);
    }

    #[test]
    fn salted_hash_fields_match_the_full_pending_line() {
        let shown = vec![pair("deadbeef", "salt:secret")];
        let got = extract_cracked(shown, &["deadbeef:salt", "deadbeef:sa"]);
        assert_eq!(got, vec![pair("deadbeef:salt", "secret")]);
    }

    #[test]
    fn repeated_show_lines_are_reported_once() {
        let shown = vec![pair("a", "pw"), pair("a", "pw")];
        assert_eq!(extract_cracked(shown, &["a", "a"]), vec![pair("a", "pw")]);
    }

    struct FailingTool {
        seen: RefCell<Vec<PathBuf>>,
    }

    impl CrackTool for FailingTool {
        fn enumerate(&self, _corpus: &Path) -> Result<Vec<Mode>, ToolError> {
            Ok(Vec::new())
        }
        fn attempt(&self, req: &AttemptRequest<'_>) -> Result<bool, ToolError> {
            self.seen.borrow_mut().push(req.subset.to_path_buf());
            self.seen.borrow_mut().push(req.store.to_path_buf());
            Err(ToolError::NotFound("hashcat".into()))
        }
        fn show(&self, _req: &AttemptRequest<'_>) -> Result<Vec<(String, String)>, ToolError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn tool_failure_still_removes_artifacts() {
        let dir = tempdir().unwrap();
        let tool = FailingTool {
            seen: RefCell::new(Vec::new()),
        };
        let runner = AttemptRunner::new(&tool, dir.path().join("words.txt"), dir.path());
        assert!(runner.run("0", &["h"]).is_err());
        let seen = tool.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|p| !p.exists()));
    }
}
