//! Durable snapshots of the activity store.
//!
//! A snapshot is one JSON document holding the whole store. Saves go through a
//! temp file + rename so a failed write never clobbers the previous copy.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{domain::UserRecord, errors::Error, store::ActivityStore, Result};

const FORMAT: &str = "chanlog-snapshot";
const VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    format: &'a str,
    version: u32,
    saved_at: DateTime<Utc>,
    users: Vec<&'a UserRecord>,
}

#[derive(Deserialize)]
struct SnapshotIn {
    format: String,
    version: u32,
    #[allow(dead_code)]
    saved_at: DateTime<Utc>,
    users: Vec<UserRecord>,
}

/// How a load attempt went. Every variant still yields a usable store.
#[derive(Debug)]
pub enum LoadStatus {
    Restored { users: usize },
    Missing,
    /// The file existed but could not be used; an empty store was substituted.
    Discarded(Error),
}

#[derive(Clone, Debug)]
pub struct SnapshotPersister {
    path: PathBuf,
}

impl SnapshotPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, store: &ActivityStore) -> Result<()> {
        let doc = SnapshotOut {
            format: FORMAT,
            version: VERSION,
            saved_at: Utc::now(),
            users: store.iter().collect(),
        };
        let bytes = serde_json::to_vec(&doc)?;

        let tmp = self.temp_path();
        let written = (|| -> Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        })();
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    /// Never fails: a missing or unusable file yields an empty store.
    pub fn load(&self) -> (ActivityStore, LoadStatus) {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return (ActivityStore::new(), LoadStatus::Missing);
            }
            Err(e) => return (ActivityStore::new(), LoadStatus::Discarded(Error::Io(e))),
        };

        match self.decode(&bytes) {
            Ok(store) => {
                let users = store.len();
                (store, LoadStatus::Restored { users })
            }
            Err(e) => (ActivityStore::new(), LoadStatus::Discarded(e)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<ActivityStore> {
        let doc: SnapshotIn = serde_json::from_slice(bytes)?;
        if doc.format != FORMAT || doc.version != VERSION {
            return Err(Error::Snapshot {
                path: self.path.clone(),
                reason: format!(
                    "unsupported snapshot format {} v{} (expected {FORMAT} v{VERSION})",
                    doc.format, doc.version
                ),
            });
        }
        Ok(ActivityStore::from_records(doc.users))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Tracks when the next periodic save is due.
///
/// The interval is measured from the last *successful* save.
#[derive(Clone, Debug)]
pub struct SnapshotTimer {
    interval: Duration,
    last_save: Instant,
}

impl SnapshotTimer {
    pub fn new(interval: Duration, started: Instant) -> Self {
        Self {
            interval,
            last_save: started,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_save) >= self.interval
    }

    pub fn mark_saved(&mut self, now: Instant) {
        self.last_save = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageEvent, PresenceAction, PresenceEvent};
    use chrono::TimeZone;

    fn sample_store() -> ActivityStore {
        let mut store = ActivityStore::new();
        let ts = |s| Utc.timestamp_opt(s, 0).unwrap();
        store.append_presence(
            "alice",
            PresenceEvent {
                timestamp: ts(10),
                server: "irc.test".into(),
                host: Some("a.example".into()),
                channel: Some("#c".into()),
                action: PresenceAction::Join,
            },
        );
        store.append_message(
            "alice",
            MessageEvent {
                timestamp: ts(12),
                host: "a.example".into(),
                server: "irc.test".into(),
                channel: "#c".into(),
            },
        );
        store.append_message(
            "alice",
            MessageEvent {
                timestamp: ts(11),
                host: "a.example".into(),
                server: "irc.test".into(),
                channel: "#d".into(),
            },
        );
        store.append_presence(
            "bob",
            PresenceEvent {
                timestamp: ts(13),
                server: "irc.test".into(),
                host: None,
                channel: None,
                action: PresenceAction::Quit,
            },
        );
        store
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path().join("irc.test.snapshot.json"));
        let store = sample_store();

        persister.save(&store).unwrap();
        let (loaded, status) = persister.load();

        assert!(matches!(status, LoadStatus::Restored { users: 2 }));
        assert_eq!(loaded, store);
        assert!(!persister.temp_path().exists());
    }

    #[test]
    fn missing_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path().join("nope.json"));
        let (store, status) = persister.load();
        assert!(store.is_empty());
        assert!(matches!(status, LoadStatus::Missing));
    }

    #[test]
    fn corrupt_file_gives_empty_store_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{ not json").unwrap();

        let (store, status) = SnapshotPersister::new(&path).load();
        assert!(store.is_empty());
        assert!(matches!(status, LoadStatus::Discarded(Error::Json(_))));
    }

    #[test]
    fn foreign_version_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(
            &path,
            r#"{"format":"chanlog-snapshot","version":99,"saved_at":"2026-01-01T00:00:00Z","users":[]}"#,
        )
        .unwrap();

        let (_, status) = SnapshotPersister::new(&path).load();
        assert!(matches!(status, LoadStatus::Discarded(Error::Snapshot { .. })));
    }

    #[test]
    fn failed_save_keeps_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let persister = SnapshotPersister::new(&path);
        persister.save(&sample_store()).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(persister.temp_path()).unwrap();
        let mut bigger = sample_store();
        bigger.fetch_or_create("carol");
        assert!(persister.save(&bigger).is_err());

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn one_save_per_interval_under_fast_polling() {
        let start = Instant::now();
        let mut timer = SnapshotTimer::new(Duration::from_secs(1), start);
        let mut saves = 0;

        // Poll every 100ms for 10 seconds.
        for tick in 1..=100u64 {
            let now = start + Duration::from_millis(tick * 100);
            if timer.is_due(now) {
                saves += 1;
                timer.mark_saved(now);
            }
        }
        assert_eq!(saves, 10);
    }

    #[test]
    fn unsaved_timer_stays_due() {
        let start = Instant::now();
        let timer = SnapshotTimer::new(Duration::from_secs(5), start);
        assert!(!timer.is_due(start + Duration::from_secs(4)));
        assert!(timer.is_due(start + Duration::from_secs(5)));
        assert!(timer.is_due(start + Duration::from_secs(60)));
    }
}
