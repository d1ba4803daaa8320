//! Durable key-value storage
//!
//! The game keeps exactly one value across sessions: the best score, stored as a
//! decimal string under [`BestScore::KEY`]. On the web this is LocalStorage.

use std::collections::HashMap;
use std::fmt;

/// Storage failures (never surfaced to the player)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The host has no store (private mode, storage disabled)
    Unavailable,
    /// The store refused the write
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Write(reason) => write!(f, "storage write failed: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

/// String key-value store provided by the host
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store (native runs and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.items.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - best score will not persist");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

/// Read/write access to the persisted best score
pub trait BestScoreStore {
    /// Stored best score, 0 when absent or unreadable
    fn load_best(&self) -> u32;
    /// Persist a new best score (failures are logged, not returned)
    fn save_best(&mut self, best: u32);
}

/// Best score kept under a single key of a [`KeyValueStore`]
#[derive(Debug, Clone, Default)]
pub struct BestScore<S> {
    store: S,
}

impl<S: KeyValueStore> BestScore<S> {
    /// Storage key
    pub const KEY: &'static str = "keepy_uppy_best_score";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> BestScoreStore for BestScore<S> {
    fn load_best(&self) -> u32 {
        self.store
            .get_item(Self::KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    fn save_best(&mut self, best: u32) {
        if let Err(e) = self.store.set_item(Self::KEY, &best.to_string()) {
            log::warn!("Could not save best score: {}", e);
        }
    }
}
