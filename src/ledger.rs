//! Running stock, derived from inbound notes.
//!
//! Nothing here is stored: available stock is whatever the notes' line items
//! say after stock-outs have decremented them.

use serde::Serialize;

use crate::config::StockflowConfig;
use crate::entity::{InboundNote, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Ok,
    Low,
    Critical,
}

impl StockStatus {
    pub fn classify(quantity: i64, config: &StockflowConfig) -> Self {
        if quantity <= config.critical_stock_threshold {
            StockStatus::Critical
        } else if quantity <= config.low_stock_threshold {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    /// Low or critical
    pub fn needs_restock(self) -> bool {
        self != StockStatus::Ok
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Ok => f.pad("ok"),
            StockStatus::Low => f.pad("low"),
            StockStatus::Critical => f.pad("critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub status: StockStatus,
}

/// Available quantity of a product summed over every note.
/// Only the first line per note counts for a given product. Saturates at
/// `i64::MAX`.
pub fn available_for(product_id: &str, notes: &[InboundNote]) -> i64 {
    notes
        .iter()
        .filter_map(|note| note.line_for(product_id))
        .fold(0i64, |total, line| total.saturating_add(line.available_quantity))
}

/// Notes a stock-out can be drawn from
pub fn notes_with_stock(notes: &[InboundNote]) -> Vec<&InboundNote> {
    notes.iter().filter(|n| n.has_stock()).collect()
}

pub fn stock_levels(
    products: &[Product],
    notes: &[InboundNote],
    config: &StockflowConfig,
) -> Vec<StockLevel> {
    products
        .iter()
        .map(|product| {
            let quantity = available_for(&product.id, notes);
            StockLevel {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity,
                status: StockStatus::classify(quantity, config),
            }
        })
        .collect()
}
