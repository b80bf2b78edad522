use crate::crack_log::CrackLog;

/// Hashes from `all` not yet recorded as cracked under `mode_id`, in corpus
/// order. Duplicates in `all` are carried through.
pub fn pending_hashes<'h>(all: &'h [String], mode_id: &str, log: &CrackLog) -> Vec<&'h str> {
    all.iter()
        .map(String::as_str)
        .filter(|h| !log.contains(h, mode_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crack_log::LogEntry;
    use tempfile::tempdir;

    fn hashes(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn excludes_exactly_the_logged_pairs_for_that_mode() {
        let dir = tempdir().unwrap();
        let mut log = CrackLog::load(dir.path().join("log.json"));
        log.append(LogEntry::now("b", "0", "x")).unwrap();
        log.append(LogEntry::now("c", "100", "y")).unwrap();

        let all = hashes(&["a", "b", "c", "b"]);
        assert_eq!(pending_hashes(&all, "0", &log), vec!["a", "c"]);
        assert_eq!(pending_hashes(&all, "100", &log), vec!["a", "b", "b"]);
        assert_eq!(pending_hashes(&all, "900", &log), vec!["a", "b", "c", "b"]);
    }

    #[test]
    fn empty_when_everything_is_logged() {
        let dir = tempdir().unwrap();
        let mut log = CrackLog::load(dir.path().join("log.json"));
        log.append(LogEntry::now("a", "0", "x")).unwrap();
        let all = hashes(&["a", "a"]);
        assert!(pending_hashes(&all, "0", &log).is_empty());
    }

    #[test]
    fn matching_is_exact_string_equality() {
        let dir = tempdir().unwrap();
        let mut log = CrackLog::load(dir.path().join("log.json"));
        log.append(LogEntry::now("ABC", "0", "x")).unwrap();
        let all = hashes(&["abc", "ABC"]);
        assert_eq!(pending_hashes(&all, "0", &log), vec!["abc"]);
    }
}
