//! Home screen numbers: totals, stock levels and recent activity.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::StockflowConfig;
use crate::entity::{InboundNote, OutboundMovement, Product};
use crate::error::Result;
use crate::ledger::{self, StockLevel};
use crate::repository;
use crate::storage::LocalStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Entrada,
    Saida,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityKind::Entrada => f.pad("entrada"),
            ActivityKind::Saida => f.pad("saida"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub product: String,
    /// Current available quantity for inbound lines, outbound quantity for
    /// stock-outs
    pub quantity: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub products: usize,
    pub inbound_notes: usize,
    pub outbound_movements: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub totals: Totals,
    pub stock: Vec<StockLevel>,
    pub recent_activity: Vec<Activity>,
}

impl Dashboard {
    pub fn load(storage: &LocalStorage, config: &StockflowConfig) -> Result<Self> {
        let products = repository::products(storage).list()?;
        let notes = repository::inbound_notes(storage).list()?;
        let movements = repository::outbound_movements(storage).list()?;
        Ok(Self::build(&products, &notes, &movements, config))
    }

    pub fn build(
        products: &[Product],
        notes: &[InboundNote],
        movements: &[OutboundMovement],
        config: &StockflowConfig,
    ) -> Self {
        let mut feed = activity_feed(notes, movements);
        feed.truncate(config.activity_feed_limit);

        Self {
            totals: Totals {
                products: products.len(),
                inbound_notes: notes.len(),
                outbound_movements: movements.len(),
            },
            stock: ledger::stock_levels(products, notes, config),
            recent_activity: feed,
        }
    }

    /// Products at or below the low-stock threshold
    pub fn low_stock(&self) -> impl Iterator<Item = &StockLevel> {
        self.stock.iter().filter(|s| s.status.needs_restock())
    }
}

/// Every inbound line and outbound item, newest date first. Entries on the
/// same date keep inbound-then-outbound insertion order.
pub fn activity_feed(notes: &[InboundNote], movements: &[OutboundMovement]) -> Vec<Activity> {
    let inbound = notes.iter().flat_map(|note| {
        note.line_items.iter().map(move |line| Activity {
            id: format!("{}-{}-entrada", note.id, line.product_id),
            kind: ActivityKind::Entrada,
            product: line.name.clone(),
            quantity: line.available_quantity,
            date: note.date,
        })
    });
    let outbound = movements.iter().flat_map(|movement| {
        movement.items.iter().map(move |item| Activity {
            id: format!("{}-{}-saida", movement.id, item.product_id()),
            kind: ActivityKind::Saida,
            product: item.line.name.clone(),
            quantity: item.outbound_quantity,
            date: movement.date,
        })
    });

    let mut feed: Vec<Activity> = inbound.chain(outbound).collect();
    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed
}
