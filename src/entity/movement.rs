use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{new_id, LineItem};

/// A line item as it was when staged, plus the quantity taken out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundItem {
    #[serde(flatten)]
    pub line: LineItem,
    pub outbound_quantity: i64,
}

impl OutboundItem {
    pub fn new(line: LineItem, outbound_quantity: i64) -> Self {
        Self {
            line,
            outbound_quantity,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.line.product_id
    }

    /// 0 < outbound <= available
    pub fn is_within_stock(&self) -> bool {
        self.outbound_quantity > 0 && self.outbound_quantity <= self.line.available_quantity
    }
}

/// A stock-out against one inbound note. Never modified once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMovement {
    pub id: String,
    pub inbound_note_id: String,
    pub date: NaiveDate,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OutboundItem>,
}

impl OutboundMovement {
    pub fn new(inbound_note_id: impl Into<String>, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            inbound_note_id: inbound_note_id.into(),
            date,
            reason: reason.into(),
            recipient: None,
            notes: None,
            items: Vec::new(),
        }
    }

    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.outbound_quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_flattens_line_fields() {
        let item = OutboundItem::new(LineItem::received("p1", "Produto 1", 10, Some(100.0)), 5);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["productId"], "p1");
        assert_eq!(json["availableQuantity"], 10);
        assert_eq!(json["outboundQuantity"], 5);

        let back: OutboundItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_is_within_stock() {
        let line = LineItem::received("p1", "A", 10, None);
        assert!(OutboundItem::new(line.clone(), 10).is_within_stock());
        assert!(!OutboundItem::new(line.clone(), 11).is_within_stock());
        assert!(!OutboundItem::new(line, 0).is_within_stock());
    }
}
