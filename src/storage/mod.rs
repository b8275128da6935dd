//! Key-value persistence.
//!
//! Every collection lives in one named slot as a JSON array. Writes that
//! span several slots go through a [`Transaction`], which checks each slot's
//! version stamp before writing and applies all slots as one backend batch.

mod backend;
mod file_backend;

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

pub use backend::{Backend, DetachedBackend, MemoryBackend, SlotWrite};
pub use file_backend::{FileBackend, STOCKFLOW_DIR};

use crate::error::{Result, StockflowError};

/// Storage slot names
pub mod keys {
    pub const PRODUCTS: &str = "produtos";
    pub const SUPPLIERS: &str = "fornecedores";
    pub const INBOUND_NOTES: &str = "notas_entrada";
    pub const OUTBOUND_MOVEMENTS: &str = "saidas_estoque";
    pub const SESSION: &str = "stockflow_auth";
    pub const THEME: &str = "theme";
    pub const VERSIONS: &str = "_versions";
}

const BUS_CAPACITY: usize = 64;

/// Published after every write, to every handle sharing the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub value: Option<String>,
}

/// Handle over a storage backend.
///
/// Cloning gives another handle on the same backend and change bus, which is
/// how separate views (or separate "tabs") of one store are modeled.
#[derive(Clone)]
pub struct LocalStorage {
    backend: Rc<dyn Backend>,
    bus: broadcast::Sender<StorageEvent>,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("available", &self.backend.is_available())
            .field("subscribers", &self.bus.receiver_count())
            .finish()
    }
}

impl LocalStorage {
    pub fn new(backend: impl Backend + 'static) -> Self {
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            backend: Rc::new(backend),
            bus,
        }
    }

    /// In-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// A store with nothing behind it; reads yield defaults
    pub fn detached() -> Self {
        Self::new(DetachedBackend)
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Receive a [`StorageEvent`] for every later write through any handle
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.bus.subscribe()
    }

    /// Read and parse `key`, or return `default` if it is absent or storage is
    /// unavailable. Never writes.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.read_raw(key)? {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str(&raw).map_err(|e| StockflowError::CorruptState {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
            _ => Ok(default),
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.write_raw(key, &raw)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.apply(vec![SlotWrite::remove(key)])
    }

    /// Read a slot as-is, without JSON decoding
    pub fn read_raw(&self, key: &str) -> Result<Option<String>> {
        if !self.backend.is_available() {
            return Ok(None);
        }
        self.backend.get(key)
    }

    pub fn write_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.apply(vec![SlotWrite::put(key, raw)])
    }

    /// Current version stamp of a collection slot (0 if never written)
    pub fn version(&self, key: &str) -> Result<u64> {
        Ok(self.versions()?.get(key).copied().unwrap_or(0))
    }

    fn versions(&self) -> Result<BTreeMap<String, u64>> {
        self.read(keys::VERSIONS, BTreeMap::new())
    }

    /// Start a multi-slot write
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction {
            storage: self,
            writes: Vec::new(),
        }
    }

    fn apply(&self, batch: Vec<SlotWrite>) -> Result<()> {
        self.backend.apply(&batch)?;
        for write in batch {
            tracing::debug!(key = %write.key, removed = write.value.is_none(), "storage write");
            // No subscribers is fine
            let _ = self.bus.send(StorageEvent {
                key: write.key,
                value: write.value,
            });
        }
        Ok(())
    }
}

struct StagedWrite {
    key: String,
    base_version: u64,
    raw: String,
}

/// Writes to several slots that land together or not at all.
///
/// Each slot is staged with the version it was read at. `commit` rejects the
/// whole transaction with [`StockflowError::StaleWrite`] if any slot has been
/// written since.
pub struct Transaction<'a> {
    storage: &'a LocalStorage,
    writes: Vec<StagedWrite>,
}

impl Transaction<'_> {
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        base_version: u64,
        value: &T,
    ) -> Result<&mut Self> {
        let raw = serde_json::to_string(value)?;
        self.writes.retain(|w| w.key != key);
        self.writes.push(StagedWrite {
            key: key.to_string(),
            base_version,
            raw,
        });
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn commit(self) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }

        let mut versions = self.storage.versions()?;
        for write in &self.writes {
            let found = versions.get(&write.key).copied().unwrap_or(0);
            if found != write.base_version {
                tracing::warn!(
                    key = %write.key,
                    expected = write.base_version,
                    found,
                    "rejecting stale write"
                );
                return Err(StockflowError::StaleWrite {
                    key: write.key.clone(),
                    expected: write.base_version,
                    found,
                });
            }
        }

        let mut batch = Vec::with_capacity(self.writes.len() + 1);
        for write in self.writes {
            versions.insert(write.key.clone(), write.base_version + 1);
            batch.push(SlotWrite::put(write.key, write.raw));
        }
        batch.push(SlotWrite::put(keys::VERSIONS, serde_json::to_string(&versions)?));

        self.storage.apply(batch)
    }
}
