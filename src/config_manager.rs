//! Live configuration holder
//!
//! Readers (sinks, consumer) take a cheap snapshot off an [`ArcSwap`] with no
//! lock contention. Writers go through [`ConfigManager::update`], which
//! serializes concurrent updates behind a mutex, validates, swaps, persists
//! to disk, then calls every subscriber with the new snapshot — the same
//! validate-then-swap-then-persist-then-notify order the original service
//! used, minus the asyncio lock it no longer needs.

use crate::config::ServerConfig;
use crate::error::{ConfigUpdateError, IngestError, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type Subscriber = Box<dyn Fn(&Arc<ServerConfig>) + Send + Sync>;

pub struct ConfigManager {
    current: ArcSwap<ServerConfig>,
    subscribers: Mutex<Vec<Subscriber>>,
    write_lock: Mutex<()>,
    config_file_path: PathBuf,
}

impl ConfigManager {
    /// Loads the persisted `config.json` at `config_file_path` if it exists
    /// and parses cleanly, otherwise falls back to `ServerConfig::default()`.
    pub fn load(config_file_path: impl Into<PathBuf>) -> Result<Self> {
        let config_file_path = config_file_path.into();
        let initial = match std::fs::read(&config_file_path) {
            Ok(bytes) => match serde_json::from_slice::<ServerConfig>(&bytes) {
                Ok(config) => config,
                Err(_) => ServerConfig::default(),
            },
            Err(_) => ServerConfig::default(),
        };

        let manager = Self {
            current: ArcSwap::from_pointee(initial),
            subscribers: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
            config_file_path,
        };
        if !manager.config_file_path.exists() {
            manager.persist(&manager.current.load())?;
        }
        Ok(manager)
    }

    /// A cheap, lock-free snapshot of the current configuration.
    pub fn current(&self) -> Arc<ServerConfig> {
        self.current.load_full()
    }

    /// Registers a callback invoked synchronously, in registration order,
    /// every time [`update`](Self::update) installs a new configuration.
    pub fn subscribe(&self, callback: impl Fn(&Arc<ServerConfig>) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(callback));
    }

    /// Validates `new_config` (deserializing it rejects unknown keys and
    /// out-of-range values). If it's semantically identical to the current
    /// snapshot, this is a no-op that just returns the current snapshot
    /// unchanged. Otherwise swaps it in, persists it to disk, and notifies
    /// subscribers. Concurrent updates are serialized; a later caller always
    /// observes the previous caller's fully-applied result.
    pub fn update(&self, new_config_json: &serde_json::Value) -> Result<Arc<ServerConfig>> {
        let _guard = self.write_lock.lock();

        let new_config: ServerConfig = serde_json::from_value(new_config_json.clone())
            .map_err(|e| IngestError::from(ConfigUpdateError::Invalid(e.to_string())))?;

        let current = self.current.load_full();
        if *current == new_config {
            return Ok(current);
        }

        let new_config = Arc::new(new_config);
        self.current.store(new_config.clone());
        self.persist(&new_config)?;

        for subscriber in self.subscribers.lock().iter() {
            subscriber(&new_config);
        }

        Ok(new_config)
    }

    /// Atomic write: serialize to a sibling temp file, then rename over the
    /// target so a reader never observes a partially-written config.json.
    fn persist(&self, config: &ServerConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp_path = Self::temp_path(&self.config_file_path);
        {
            let mut tmp = std::fs::File::create(&tmp_path)?;
            tmp.write_all(json.as_bytes())?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.config_file_path)?;
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}
