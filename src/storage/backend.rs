use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;

/// A single slot write. `None` removes the key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotWrite {
    pub key: String,
    pub value: Option<String>,
}

impl SlotWrite {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

/// Raw string key-value storage underneath [`super::LocalStorage`].
///
/// `apply` must make the whole batch visible or none of it, as far as a
/// later reader (possibly after a crash and reopen) can tell.
pub trait Backend {
    /// False when there is no storage to talk to at all.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn apply(&self, batch: &[SlotWrite]) -> Result<()>;
}

/// In-process storage, used by tests and when embedding the library.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn apply(&self, batch: &[SlotWrite]) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        for write in batch {
            match &write.value {
                Some(value) => {
                    slots.insert(write.key.clone(), value.clone());
                }
                None => {
                    slots.remove(&write.key);
                }
            }
        }
        Ok(())
    }
}

/// No storage present: every read misses and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBackend;

impl Backend for DetachedBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn apply(&self, _batch: &[SlotWrite]) -> Result<()> {
        Ok(())
    }
}
