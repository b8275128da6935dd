//! Typed collections over [`LocalStorage`].
//!
//! Every operation reads the whole array, changes it in memory and writes
//! the whole array back through a versioned transaction.

use std::marker::PhantomData;

use crate::entity::{InboundNote, OutboundMovement, Product, Record, Supplier};
use crate::error::{Result, StockflowError};
use crate::storage::LocalStorage;

/// A collection as read, with the version it was read at
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub version: u64,
    pub items: Vec<T>,
}

impl<T: Record> Snapshot<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }
}

pub struct Repository<'a, T> {
    storage: &'a LocalStorage,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Repository<'a, T> {
    pub fn new(storage: &'a LocalStorage) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    pub fn list(&self) -> Result<Vec<T>> {
        self.storage.read(T::KEY, Vec::new())
    }

    pub fn snapshot(&self) -> Result<Snapshot<T>> {
        // Version first: a write landing between the two reads makes the
        // snapshot look stale rather than fresh
        let version = self.storage.version(T::KEY)?;
        let items = self.list()?;
        Ok(Snapshot { version, items })
    }

    pub fn find(&self, id: &str) -> Result<Option<T>> {
        Ok(self.list()?.into_iter().find(|item| item.id() == id))
    }

    pub fn get(&self, id: &str) -> Result<T> {
        self.find(id)?
            .ok_or_else(|| StockflowError::EntityNotFound(id.to_string()))
    }

    pub fn append(&self, entity: T) -> Result<()> {
        let mut snapshot = self.snapshot()?;
        snapshot.items.push(entity);
        self.commit(snapshot)
    }

    pub fn replace_all(&self, entities: &[T]) -> Result<()> {
        let version = self.storage.version(T::KEY)?;
        let mut tx = self.storage.transaction();
        tx.put(T::KEY, version, entities)?;
        tx.commit()
    }

    /// Remove by id. Returns false if nothing matched.
    pub fn remove_by_id(&self, id: &str) -> Result<bool> {
        let mut snapshot = self.snapshot()?;
        let before = snapshot.items.len();
        snapshot.items.retain(|item| item.id() != id);
        if snapshot.items.len() == before {
            return Ok(false);
        }
        self.commit(snapshot)?;
        Ok(true)
    }

    /// Write `snapshot.items` back, failing if the slot moved past `snapshot.version`
    pub fn commit(&self, snapshot: Snapshot<T>) -> Result<()> {
        let mut tx = self.storage.transaction();
        tx.put(T::KEY, snapshot.version, &snapshot.items)?;
        tx.commit()
    }
}

pub fn products(storage: &LocalStorage) -> Repository<'_, Product> {
    Repository::new(storage)
}

pub fn suppliers(storage: &LocalStorage) -> Repository<'_, Supplier> {
    Repository::new(storage)
}

pub fn inbound_notes(storage: &LocalStorage) -> Repository<'_, InboundNote> {
    Repository::new(storage)
}

pub fn outbound_movements(storage: &LocalStorage) -> Repository<'_, OutboundMovement> {
    Repository::new(storage)
}

impl Repository<'_, Product> {
    pub fn find_by_name(&self, name: &str) -> Result<Option<Product>> {
        Ok(self.list()?.into_iter().find(|p| p.matches_name(name)))
    }

    /// Case-insensitive lookup, creating the product if unseen
    pub fn find_or_create(&self, name: &str) -> Result<Product> {
        if let Some(existing) = self.find_by_name(name)? {
            return Ok(existing);
        }
        let product = Product::new(name);
        tracing::info!(id = %product.id, name = %product.name, "created product");
        self.append(product.clone())?;
        Ok(product)
    }
}

impl Repository<'_, Supplier> {
    pub fn find_by_name(&self, name: &str) -> Result<Option<Supplier>> {
        Ok(self.list()?.into_iter().find(|s| s.matches_name(name)))
    }
}

impl Repository<'_, InboundNote> {
    pub fn find_by_number(&self, number: &str) -> Result<Option<InboundNote>> {
        Ok(self.list()?.into_iter().find(|n| n.number == number))
    }

    /// Look a note up by id, falling back to its number
    pub fn resolve(&self, id_or_number: &str) -> Result<InboundNote> {
        let notes = self.list()?;
        notes
            .iter()
            .find(|n| n.id == id_or_number)
            .or_else(|| notes.iter().find(|n| n.number == id_or_number))
            .cloned()
            .ok_or_else(|| StockflowError::EntityNotFound(id_or_number.to_string()))
    }
}
