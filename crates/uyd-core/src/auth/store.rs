use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Storage key for the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "uyd_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "uyd_refresh_token";

/// Storage file name in the storage directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Synchronous string key-value store that outlives the process.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Nothing survives the process, which makes it the
/// store of choice for tests running side by side.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// JSON file of string pairs, read and rewritten on every operation.
pub struct FileStore {
    storage_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            storage_dir,
            guard: Mutex::new(()),
        }
    }

    fn storage_path(&self) -> PathBuf {
        self.storage_dir.join(STORAGE_FILE)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let path = self.storage_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let path = self.storage_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)?;
        debug!(key, "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _lock = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
            debug!(key, "Removed value");
        }
        Ok(())
    }
}
