use crate::app_dirs::AppDirs;
use crate::session::{QuoteLength, TestMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const TIME_OPTIONS: [u32; 4] = [15, 30, 60, 120];
pub const WORD_OPTIONS: [usize; 4] = [10, 25, 50, 100];

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Time,
    Words,
    Quote,
}

/// Persisted session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: ModeKind,
    pub time_secs: u32,
    pub word_count: usize,
    pub quote_length: QuoteLength,
    pub include_punctuation: bool,
    pub include_numbers: bool,
    pub confidence_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ModeKind::Time,
            time_secs: 30,
            word_count: 25,
            quote_length: QuoteLength::Medium,
            include_punctuation: false,
            include_numbers: false,
            confidence_mode: false,
        }
    }
}

impl Config {
    pub fn test_mode(&self) -> TestMode {
        match self.mode {
            ModeKind::Time => TestMode::Time {
                seconds: self.time_secs,
            },
            ModeKind::Words => TestMode::Words {
                count: self.word_count,
            },
            ModeKind::Quote => TestMode::Quote {
                length: self.quote_length,
            },
        }
    }

    /// Replace values outside the offered choices with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Config::default();
        if !TIME_OPTIONS.contains(&self.time_secs) {
            warn!(time_secs = self.time_secs, "unsupported duration, using default");
            self.time_secs = defaults.time_secs;
        }
        if !WORD_OPTIONS.contains(&self.word_count) {
            warn!(word_count = self.word_count, "unsupported word count, using default");
            self.word_count = defaults.word_count;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("rapidkeys_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
