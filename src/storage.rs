use anyhow::{Context, Result};
use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const REMEMBERED_RIGHT_VERSION: &str = "split_right_version";
pub const LAST_BOOK: &str = "last_book";
pub const LAST_CHAPTER: &str = "last_chapter";
pub const LAST_READ_AT: &str = "last_read_at";
pub const BIBLE_VERSION: &str = "bible_version";
pub const SPLIT_VIEW_OPEN: &str = "split_view_open";
pub const SPLIT_RATIO: &str = "split_ratio";

const STATE_FILENAME: &str = ".parabible_state.yaml";

/// Plain string key-value storage. Last write wins; nothing is transactional.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Key-value store persisted as a flat YAML map, rewritten on every `set`.
pub struct YamlFileStore {
    file_path: PathBuf,
    values: BTreeMap<String, String>,
}

impl YamlFileStore {
    /// Opens `~/.parabible_state.yaml`, falling back to the working directory
    /// when the home directory is unknown.
    pub fn open_default() -> Result<Self> {
        let dir = match home::home_dir() {
            Some(home) => home,
            None => {
                warn!("Could not determine home directory, storing state in current directory");
                std::env::current_dir().context("Could not determine current directory")?
            }
        };
        Self::open(dir.join(STATE_FILENAME))
    }

    pub fn open(file_path: PathBuf) -> Result<Self> {
        let values = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened state store {:?} with {} keys", file_path, values.len());
        Ok(Self { file_path, values })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(file_path: &Path) -> Result<BTreeMap<String, String>> {
        let content = fs::read_to_string(file_path).context("Failed to read state file")?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yaml::from_str(&content).context("Failed to parse state YAML")
    }

    fn save_to_disk(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.values).context("Failed to serialize state")?;

        fs::write(&self.file_path, yaml).context("Failed to write state file")?;

        Ok(())
    }
}

impl KeyValueStore for YamlFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save_to_disk() {
            error!("Failed to persist {key:?} to {:?}: {e:#}", self.file_path);
        }
    }
}
