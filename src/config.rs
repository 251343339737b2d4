use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::runtime::DEFAULT_POLL_INTERVAL_MS;
use crate::words::{WordList, DEFAULT_WORDS};

pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

/// Stored defaults for a test. Command line flags override these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub words: String,
    pub time_limit_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.to_string(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Validated settings the session is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub words: WordList,
    pub time_limit: Duration,
    pub poll_interval: Duration,
}

impl Config {
    pub fn validate(&self) -> Result<SessionSettings> {
        if self.time_limit_secs == 0 {
            return Err(Error::InvalidTimeLimit(self.time_limit_secs));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidPollInterval(self.poll_interval_ms));
        }

        Ok(SessionSettings {
            words: WordList::from_text(&self.words)?,
            time_limit: Duration::from_secs(self.time_limit_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("wordsprint.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "config_unreadable");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)?;
        Ok(())
    }
}
