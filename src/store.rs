use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;

use crate::StoreError;

pub const DEFAULT_DIR: &str = "saved_files";
pub const DEFAULT_CAP: usize = 50;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const SUMMARY_PREFIX: &str = "summary_";
const TRANSCRIPT_PREFIX: &str = "transcript_";
const SUMMARY_EXT: &str = "md";
const TRANSCRIPT_EXT: &str = "txt";

/// One saved summary/transcript pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionEntry {
    pub stamp: String,
    pub summary_path: PathBuf,
    pub transcript_path: PathBuf,
}

/// Sort key: the second-resolution timestamp, then the same-second counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct StampKey {
    at: NaiveDateTime,
    seq: u32,
}

fn parse_stamp(stamp: &str) -> Option<StampKey> {
    let (base, seq) = match stamp.get(15..) {
        Some("") | None => (stamp, 0),
        Some(rest) => (&stamp[..15], rest.strip_prefix('_')?.parse().ok()?),
    };
    let at = NaiveDateTime::parse_from_str(base, STAMP_FORMAT).ok()?;
    Some(StampKey { at, seq })
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io("removing", path)(e)),
    }
}

/// Directory of the most recent summaries, capped at a fixed number of pairs
#[derive(Debug, Clone)]
pub struct RetentionStore {
    dir: PathBuf,
    cap: usize,
}

impl RetentionStore {
    pub fn new(dir: impl Into<PathBuf>, cap: usize) -> Self {
        Self { dir: dir.into(), cap }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Save a pair stamped with the current local time, then prune
    pub fn persist(&self, summary: &str, transcript: &str) -> Result<RetentionEntry, StoreError> {
        self.persist_at(Local::now().naive_local(), summary, transcript)
    }

    /// Save a pair stamped with `at`, then prune
    pub fn persist_at(&self, at: NaiveDateTime, summary: &str, transcript: &str) -> Result<RetentionEntry, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(StoreError::io("creating", &self.dir))?;

        let entry = self.free_entry(at);
        std::fs::write(&entry.summary_path, summary).map_err(StoreError::io("writing", &entry.summary_path))?;
        if let Err(e) = std::fs::write(&entry.transcript_path, transcript) {
            remove_if_present(&entry.summary_path)?;
            return Err(StoreError::io("writing", &entry.transcript_path)(e));
        }
        info!("Saved summary {}", entry.summary_path.display());

        self.prune()?;
        Ok(entry)
    }

    /// Retained pairs, oldest first
    pub fn entries(&self) -> Result<Vec<RetentionEntry>, StoreError> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io("listing", &self.dir)(e)),
        };

        let mut keyed = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(StoreError::io("listing", &self.dir))?;
            let name = dir_entry.file_name();
            let Some(stamp) = name
                .to_str()
                .and_then(|n| n.strip_prefix(SUMMARY_PREFIX))
                .and_then(|n| n.strip_suffix(&format!(".{SUMMARY_EXT}")))
            else {
                continue;
            };
            let Some(key) = parse_stamp(stamp) else {
                continue;
            };
            let entry = self.entry(stamp);
            // A summary without its transcript is a broken pair, not a retained entry
            if entry.transcript_path.exists() {
                keyed.push((key, entry));
            }
        }

        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Remove the oldest pairs until at most `cap` remain
    pub fn prune(&self) -> Result<Vec<RetentionEntry>, StoreError> {
        let entries = self.entries()?;
        let excess = entries.len().saturating_sub(self.cap);
        let evicted: Vec<_> = entries.into_iter().take(excess).collect();

        for entry in &evicted {
            debug!("Evicting saved pair {}", entry.stamp);
            remove_if_present(&entry.summary_path)?;
            remove_if_present(&entry.transcript_path)?;
        }
        Ok(evicted)
    }

    fn entry(&self, stamp: &str) -> RetentionEntry {
        RetentionEntry {
            stamp: stamp.to_string(),
            summary_path: self.dir.join(format!("{SUMMARY_PREFIX}{stamp}.{SUMMARY_EXT}")),
            transcript_path: self.dir.join(format!("{TRANSCRIPT_PREFIX}{stamp}.{TRANSCRIPT_EXT}")),
        }
    }

    /// First stamp for `at` whose files do not exist yet
    fn free_entry(&self, at: NaiveDateTime) -> RetentionEntry {
        let base = at.format(STAMP_FORMAT).to_string();
        let mut entry = self.entry(&base);
        let mut seq = 1;
        while entry.summary_path.exists() || entry.transcript_path.exists() {
            entry = self.entry(&format!("{base}_{seq}"));
            seq += 1;
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(sec as i64)
    }

    #[test]
    fn test_parse_stamp() {
        let key = parse_stamp("20240301_120005").unwrap();
        assert_eq!(key.at, at(5));
        assert_eq!(key.seq, 0);

        let key = parse_stamp("20240301_120005_2").unwrap();
        assert_eq!(key.seq, 2);

        assert!(parse_stamp("notes").is_none());
        assert!(parse_stamp("20240301_120005x").is_none());
    }

    #[test]
    fn test_persist_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path().join("saved_files"), 20);

        let entry = store.persist_at(at(0), "# Notes", "full transcript").unwrap();
        assert_eq!(entry.stamp, "20240301_120000");
        assert_eq!(
            entry.summary_path,
            dir.path().join("saved_files/summary_20240301_120000.md")
        );
        assert_eq!(std::fs::read_to_string(&entry.summary_path).unwrap(), "# Notes");
        assert_eq!(
            std::fs::read_to_string(&entry.transcript_path).unwrap(),
            "full transcript"
        );
    }

    #[test]
    fn test_same_second_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path(), 20);

        let first = store.persist_at(at(0), "one", "one").unwrap();
        let second = store.persist_at(at(0), "two", "two").unwrap();
        assert_ne!(first.stamp, second.stamp);
        assert_eq!(second.stamp, "20240301_120000_1");

        let entries = store.entries().unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn test_entries_ordered_by_stamp_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path(), 20);
        store.persist_at(at(0), "a", "a").unwrap();
        store.persist_at(at(0), "b", "b").unwrap();
        store.persist_at(at(1), "c", "c").unwrap();

        let stamps: Vec<_> = store.entries().unwrap().into_iter().map(|e| e.stamp).collect();
        assert_eq!(stamps, vec!["20240301_120000", "20240301_120000_1", "20240301_120001"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path(), 3);
        for sec in 0..5 {
            store.persist_at(at(sec), "s", "t").unwrap();
        }

        let stamps: Vec<_> = store.entries().unwrap().into_iter().map(|e| e.stamp).collect();
        assert_eq!(stamps, vec!["20240301_120002", "20240301_120003", "20240301_120004"]);
        assert!(!dir.path().join("summary_20240301_120000.md").exists());
        assert!(!dir.path().join("transcript_20240301_120001.txt").exists());
    }

    #[test]
    fn test_foreign_files_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "keep me").unwrap();
        let store = RetentionStore::new(dir.path(), 1);
        store.persist_at(at(0), "s", "t").unwrap();
        store.persist_at(at(1), "s", "t").unwrap();

        assert!(dir.path().join("README.md").exists());
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_half_written_pair_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path(), 2);
        let kept = store.persist_at(at(1), "s", "t").unwrap();
        std::fs::write(dir.path().join("summary_20240301_120000.md"), "orphan").unwrap();

        assert_eq!(store.entries().unwrap(), vec![kept.clone()]);

        let newest = store.persist_at(at(2), "s", "t").unwrap();
        assert_eq!(store.entries().unwrap(), vec![kept, newest]);
    }

    #[test]
    fn test_remove_if_present_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_20240301_120000.md");
        remove_if_present(&path).unwrap();
        std::fs::write(&path, "x").unwrap();
        remove_if_present(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_entries_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(dir.path().join("nope"), 5);
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_dir_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("saved_files");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = RetentionStore::new(&blocker, 5);

        let err = store.persist_at(at(0), "s", "t").unwrap_err();
        assert!(err.to_string().starts_with("creating"));
    }
}
