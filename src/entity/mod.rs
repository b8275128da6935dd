mod movement;
mod note;
mod product;
mod user;

pub use movement::{OutboundItem, OutboundMovement};
pub use note::{InboundNote, LineItem};
pub use product::{Product, Supplier};
pub use user::DemoUser;

use uuid::Uuid;

use crate::storage::keys;

/// A record stored in one named collection slot
pub trait Record: serde::Serialize + serde::de::DeserializeOwned + Clone {
    /// Storage slot holding the JSON array of these records
    const KEY: &'static str;

    fn id(&self) -> &str;
}

impl Record for Product {
    const KEY: &'static str = keys::PRODUCTS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Supplier {
    const KEY: &'static str = keys::SUPPLIERS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for InboundNote {
    const KEY: &'static str = keys::INBOUND_NOTES;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for OutboundMovement {
    const KEY: &'static str = keys::OUTBOUND_MOVEMENTS;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// First 7 characters of an id, for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(7) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
