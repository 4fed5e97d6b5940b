use crate::results::SessionResult;
use crate::session::KeyStat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "history";
pub const KEY_STATS_KEY: &str = "keystats";

/// Most recent results kept.
pub const MAX_HISTORY: usize = 50;

/// Keys with more attempts than this and lower accuracy than [`WEAK_KEY_ACCURACY`]
/// are practice targets.
pub const WEAK_KEY_MIN_ATTEMPTS: u64 = 5;
pub const WEAK_KEY_ACCURACY: f64 = 0.85;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal string key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process store, used for `--no-save` runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Past results and long-term per-key accuracy.
///
/// Reads never fail: missing or malformed data is treated as no history.
#[derive(Debug)]
pub struct History<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> History<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Newest first.
    pub fn results(&self) -> Vec<SessionResult> {
        self.load(HISTORY_KEY).unwrap_or_default()
    }

    pub fn best_wpm(&self) -> Option<u32> {
        self.results().iter().map(|r| r.wpm).max()
    }

    pub fn record_result(&mut self, result: SessionResult) -> Result<(), StoreError> {
        let mut results = self.results();
        results.insert(0, result);
        results.truncate(MAX_HISTORY);
        self.save(HISTORY_KEY, &results)
    }

    pub fn key_stats(&self) -> BTreeMap<char, KeyStat> {
        let stored: BTreeMap<String, KeyStat> = self.load(KEY_STATS_KEY).unwrap_or_default();
        stored
            .into_iter()
            .filter_map(|(k, v)| {
                let mut chars = k.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((c, v)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Fold a session's key stats into the stored ones.
    ///
    /// Stored errors decay by 10% (rounded down) first so old weaknesses fade.
    pub fn record_key_stats(
        &mut self,
        session: &BTreeMap<char, KeyStat>,
    ) -> Result<(), StoreError> {
        if session.is_empty() {
            return Ok(());
        }
        let mut stats = self.key_stats();
        for stat in stats.values_mut() {
            stat.errors = stat.errors * 9 / 10;
        }
        for (c, s) in session {
            let entry = stats.entry(*c).or_default();
            entry.total += s.total;
            entry.errors += s.errors;
        }
        let stored: BTreeMap<String, KeyStat> =
            stats.into_iter().map(|(c, s)| (c.to_string(), s)).collect();
        self.save(KEY_STATS_KEY, &stored)
    }

    /// Characters worth biasing word selection toward.
    pub fn weak_keys(&self) -> Vec<char> {
        self.key_stats()
            .into_iter()
            .filter(|(_, s)| s.total > WEAK_KEY_MIN_ATTEMPTS && s.accuracy() < WEAK_KEY_ACCURACY)
            .map(|(c, _)| c)
            .collect()
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read history, starting empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed history");
                None
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_string(value)?;
        self.store.set(key, &data)?;
        debug!(key, bytes = data.len(), "history saved");
        Ok(())
    }
}
