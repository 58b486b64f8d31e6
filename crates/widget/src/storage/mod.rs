//! Cart persistence.
//!
//! Two layers:
//!
//! - [`KeyValueStore`] is the platform slot: raw strings under string keys,
//!   the shape of browser `localStorage`. [`MemoryStore`] and [`FileStore`]
//!   implement it.
//! - [`CartStorage`] is the port the cart store talks to: `load()` and
//!   `save(items)`. [`JsonCartStorage`] implements it by writing the JSON
//!   array of cart lines under one key.
//!
//! [`ConfiguredStore`] picks the key-value store from [`WidgetConfig`]: a
//! [`FileStore`] when `SHOPCART_STORAGE_DIR` is set, otherwise memory.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use shopcart_core::CartLineItem;
use thiserror::Error;

use crate::config::WidgetConfig;

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted value is not a valid cart.
    #[error("Corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backing store.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backing store cannot be used right now.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw string key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// The key-value store selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl ConfiguredStore {
    /// Open the store `config` asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn from_config(config: &WidgetConfig) -> Result<Self, StorageError> {
        match &config.storage_dir {
            Some(dir) => Ok(Self::File(FileStore::open(dir.clone())?)),
            None => {
                tracing::debug!("no storage directory configured, cart kept in memory");
                Ok(Self::Memory(MemoryStore::new()))
            }
        }
    }
}

impl KeyValueStore for ConfiguredStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Memory(store) => store.get_item(key),
            Self::File(store) => store.get_item(key),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.set_item(key, value),
            Self::File(store) => store.set_item(key, value),
        }
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.remove_item(key),
            Self::File(store) => store.remove_item(key),
        }
    }
}

/// Persistence port for the cart store.
pub trait CartStorage {
    /// Load the persisted cart. `Ok(None)` means nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if a value exists but does not parse.
    fn load(&self) -> Result<Option<Vec<CartLineItem>>, StorageError>;

    /// Replace the persisted cart with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn save(&mut self, items: &[CartLineItem]) -> Result<(), StorageError>;
}

/// [`CartStorage`] over a [`KeyValueStore`], as a JSON array under one key.
#[derive(Debug, Clone)]
pub struct JsonCartStorage<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> JsonCartStorage<K> {
    /// Persist the cart in `store` under `key`.
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The key the cart is written under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn store(&self) -> &K {
        &self.store
    }
}

impl<K: KeyValueStore> CartStorage for JsonCartStorage<K> {
    fn load(&self) -> Result<Option<Vec<CartLineItem>>, StorageError> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(None);
        };
        // A blank or `null` value counts as nothing saved.
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&mut self, items: &[CartLineItem]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items)?;
        self.store.set_item(&self.key, &json)
    }
}
