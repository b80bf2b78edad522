//! Persistent ledger of cracked `(hash, mode)` pairs.
//!
//! The ledger is a pretty-printed JSON array of [`LogEntry`] records. It is
//! loaded once, only ever grows, and is rewritten in full after every append
//! through a temp-file-and-rename so an interrupted write cannot truncate it.
//!
//! An unreadable ledger is treated as empty. The broken file is moved aside
//! to `<ledger>.corrupt` first (or `<ledger>.corrupt.<n>` when earlier copies
//! exist), so neither the next append nor a later quarantine overwrites it.
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default ledger file name, resolved against the working directory.
pub const DEFAULT_LOG_FILE: &str = "crack_log.json";

/// One cracked hash under one mode. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub hash: String,
    pub mode_id: String,
    pub clear: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Entry stamped with the current UTC time.
    pub fn now(hash: &str, mode_id: &str, clear: &str) -> Self {
        Self {
            hash: hash.to_string(),
            mode_id: mode_id.to_string(),
            clear: clear.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub struct CrackLog {
    path: PathBuf,
    entries: Vec<LogEntry>,
    // mode_id -> hashes, derived from `entries`; only touched by
    // `from_entries` and `append`.
    keys: HashMap<String, HashSet<String>>,
}

impl CrackLog {
    /// Load the ledger at `path`. Missing or unparsable files yield an empty
    /// log; this never fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                log::info!("no crack log at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                log::warn!("ignoring unreadable crack log: {:#}", e);
                quarantine(&path);
                Vec::new()
            }
        };
        Self::from_entries(path, entries)
    }

    fn from_entries(path: PathBuf, entries: Vec<LogEntry>) -> Self {
        let mut keys: HashMap<String, HashSet<String>> = HashMap::new();
        for e in &entries {
            keys.entry(e.mode_id.clone())
                .or_default()
                .insert(e.hash.clone());
        }
        Self {
            path,
            entries,
            keys,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once `hash` has been recorded as cracked under `mode_id`.
    pub fn contains(&self, hash: &str, mode_id: &str) -> bool {
        self.keys
            .get(mode_id)
            .is_some_and(|hashes| hashes.contains(hash))
    }

    /// Append `entry` and persist the whole ledger before returning.
    ///
    /// Duplicate `(hash, mode_id)` pairs are appended as-is.
    pub fn append(&mut self, entry: LogEntry) -> Result<()> {
        self.keys
            .entry(entry.mode_id.clone())
            .or_default()
            .insert(entry.hash.clone());
        self.entries.push(entry);
        self.save()
    }

    /// Rewrite the ledger file atomically.
    pub fn save(&self) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(&self.entries).context("failed to serialize crack log")?;
        atomic_write(&self.path, &bytes)
    }
}

fn read_entries(path: &Path) -> Result<Option<Vec<LogEntry>>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes =
        fs::read(path).with_context(|| format!("failed to read crack log: {}", path.display()))?;
    let entries = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse crack log: {}", path.display()))?;
    Ok(Some(entries))
}

fn quarantine(path: &Path) {
    if !path.is_file() {
        return;
    }
    let aside = quarantine_target(path);
    match fs::rename(path, &aside) {
        Ok(()) => log::warn!("moved unreadable crack log to {}", aside.display()),
        Err(e) => log::warn!("could not move {} aside: {}", path.display(), e),
    }
}

/// First of `<path>.corrupt`, `<path>.corrupt.1`, `<path>.corrupt.2`, ...
/// that does not exist yet.
fn quarantine_target(path: &Path) -> PathBuf {
    let mut base = path.as_os_str().to_os_string();
    base.push(".corrupt");
    let first = PathBuf::from(&base);
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| {
            let mut name = base.clone();
            name.push(format!(".{}", n));
            PathBuf::from(name)
        })
        .find(|p| !p.exists())
        .unwrap_or(first)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(
        ".crack_log.tmp_{}_{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or(0)
    ));

    {
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("failed to create temp file: {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("failed to write temp file: {}", tmp.display()))?;
        f.sync_all()
            .with_context(|| format!("failed to sync temp file: {}", tmp.display()))?;
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| {
            format!(
                "failed to replace crack log: tmp={} dest={}",
                tmp.display(),
                path.display()
            )
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_log() {
        let dir = tempdir().unwrap();
        let log = CrackLog::load(dir.path().join("crack_log.json"));
        assert!(log.is_empty());
        assert!(!log.contains("h", "0"));
    }

    #[test]
    fn append_persists_and_reload_keeps_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        let mut log = CrackLog::load(&path);
        log.append(LogEntry::now("h1", "0", "password")).unwrap();
        log.append(LogEntry::now("h2", "100", "a:b")).unwrap();
        assert!(log.contains("h1", "0"));
        assert!(!log.contains("h1", "100"));

        let reloaded = CrackLog::load(&path);
        assert_eq!(reloaded.entries(), log.entries());
        assert!(reloaded.contains("h1", "0"));
        assert!(reloaded.contains("h2", "100"));
        assert!(!reloaded.contains("h2", "0"));
    }

    #[test]
    fn on_disk_format_uses_expected_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        let mut log = CrackLog::load(&path);
        log.append(LogEntry::now("h1", "0", "password")).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let rec = &raw.as_array().unwrap()[0];
        assert_eq!(rec["hash"], "h1");
        assert_eq!(rec["mode_id"], "0");
        assert_eq!(rec["clear"], "password");
        assert!(rec["timestamp"].as_str().unwrap().starts_with("20"));
    }

    #[test]
    fn reads_offset_style_iso_timestamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        fs::write(
            &path,
            r#"[{"hash":"h","mode_id":"0","clear":"pw","timestamp":"2024-05-01T12:00:00.123456+00:00"}]"#,
        )
        .unwrap();
        let log = CrackLog::load(&path);
        assert_eq!(log.len(), 1);
        assert!(log.contains("h", "0"));
    }

    #[test]
    fn corrupt_file_is_moved_aside_and_log_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        fs::write(&path, "{ not json").unwrap();
        let mut log = CrackLog::load(&path);
        assert!(log.is_empty());
        let aside = dir.path().join("crack_log.json.corrupt");
        assert_eq!(fs::read_to_string(&aside).unwrap(), "{ not json");

        log.append(LogEntry::now("h", "0", "pw")).unwrap();
        assert_eq!(CrackLog::load(&path).len(), 1);
        assert_eq!(fs::read_to_string(&aside).unwrap(), "{ not json");
    }

    #[test]
    fn repeated_corruption_keeps_every_broken_copy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        fs::write(&path, "first broken").unwrap();
        assert!(CrackLog::load(&path).is_empty());
        fs::write(&path, "second broken").unwrap();
        assert!(CrackLog::load(&path).is_empty());
        fs::write(&path, "third broken").unwrap();
        assert!(CrackLog::load(&path).is_empty());

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("crack_log.json.corrupt"), "first broken");
        assert_eq!(read("crack_log.json.corrupt.1"), "second broken");
        assert_eq!(read("crack_log.json.corrupt.2"), "third broken");
        assert!(!path.exists());
    }

    #[test]
    fn lookups_are_keyed_by_mode_then_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        fs::write(
            &path,
            r#"[{"hash":"h1","mode_id":"0","clear":"a","timestamp":"2024-01-01T00:00:00Z"},
               {"hash":"h2","mode_id":"10","clear":"b","timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let mut log = CrackLog::load(&path);
        assert!(log.contains("h1", "0"));
        assert!(!log.contains("h1", "10"));
        assert!(!log.contains("h2", "0"));
        assert!(!log.contains("0", "h1"));
        assert!(!log.contains("h1", "1"));

        log.append(LogEntry::now("h1", "10", "c")).unwrap();
        assert!(log.contains("h1", "10"));
        assert!(log.contains("h2", "10"));
        assert!(!log.contains("h2", "0"));
    }

    #[test]
    fn duplicate_pairs_are_appended_not_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        let mut log = CrackLog::load(&path);
        log.append(LogEntry::now("h", "0", "pw")).unwrap();
        log.append(LogEntry::now("h", "0", "pw")).unwrap();
        assert_eq!(CrackLog::load(&path).len(), 2);
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crack_log.json");
        let mut log = CrackLog::load(&path);
        log.append(LogEntry::now("h", "0", "pw")).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["crack_log.json".to_string()]);
    }
}
