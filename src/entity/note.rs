// src/entity/note.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::new_id;

/// One product line on an inbound note.
///
/// `available_quantity` starts as the quantity received and is decremented
/// in place by every stock-out against the note. `received_quantity` keeps
/// the original figure; older data may not have it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub available_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

impl LineItem {
    pub fn received(
        product_id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Option<f64>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            available_quantity: quantity,
            received_quantity: Some(quantity),
            unit_price,
        }
    }

    pub fn has_stock(&self) -> bool {
        self.available_quantity > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundNote {
    pub id: String,
    pub number: String,
    pub supplier_id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub line_items: Vec<LineItem>,
}

impl InboundNote {
    pub fn new(number: impl Into<String>, supplier_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            number: number.into(),
            supplier_id: supplier_id.into(),
            date,
            notes: None,
            line_items: Vec::new(),
        }
    }

    /// First line item for `product_id`
    pub fn line_for(&self, product_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|l| l.product_id == product_id)
    }

    /// True if any line still has quantity available
    pub fn has_stock(&self) -> bool {
        self.line_items.iter().any(LineItem::has_stock)
    }

    /// Received quantity x unit price, summed over lines that carry a price.
    /// Lines without a received figure use their available quantity.
    pub fn received_value(&self) -> f64 {
        self.line_items
            .iter()
            .filter_map(|l| {
                let quantity = l.received_quantity.unwrap_or(l.available_quantity);
                l.unit_price.map(|p| p * quantity as f64)
            })
            .sum()
    }

    /// Available quantity summed over all lines, saturating at `i64::MAX`
    pub fn available_total(&self) -> i64 {
        self.line_items
            .iter()
            .fold(0i64, |total, l| total.saturating_add(l.available_quantity))
    }
}
