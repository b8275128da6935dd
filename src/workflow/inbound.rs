//! Stock-in: building and submitting an inbound note.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::StockflowConfig;
use crate::entity::{InboundNote, LineItem, Supplier};
use crate::error::{Result, StockflowError};
use crate::repository;
use crate::route::{Redirect, Route};
use crate::storage::{keys, LocalStorage};

/// A product line on the draft, before submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedInbound {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

#[derive(Debug, Clone)]
pub struct InboundReceipt {
    pub note: InboundNote,
    pub supplier: Supplier,
    pub supplier_created: bool,
    pub redirect: Redirect,
}

/// The stock-in form
#[derive(Debug, Clone, Default)]
pub struct InboundDraft {
    pub supplier: String,
    pub number: String,
    pub date: Option<NaiveDate>,
    pub notes: String,
    items: Vec<StagedInbound>,
}

impl InboundDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: Some(today),
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[StagedInbound] {
        &self.items
    }

    /// Stage a product line. The product is looked up by name
    /// (case-insensitive) and created if unseen. Adding a product that is
    /// already staged adds to its quantity, replaces its unit price and adds
    /// to its subtotal.
    pub fn add_item(
        &mut self,
        storage: &LocalStorage,
        name: &str,
        quantity: i64,
        unit_price: f64,
    ) -> Result<&StagedInbound> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StockflowError::MissingField("product"));
        }
        if quantity <= 0 {
            return Err(StockflowError::InvalidQuantity {
                product: name.to_string(),
                quantity,
            });
        }
        if !(unit_price > 0.0) || !unit_price.is_finite() {
            return Err(StockflowError::InvalidPrice(unit_price));
        }

        let product = repository::products(storage).find_or_create(name)?;
        let subtotal = quantity as f64 * unit_price;

        let idx = match self.items.iter().position(|i| i.product_id == product.id) {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    StockflowError::InvalidQuantity {
                        product: item.name.clone(),
                        quantity,
                    }
                })?;
                item.unit_price = unit_price;
                item.subtotal += subtotal;
                idx
            }
            None => {
                self.items.push(StagedInbound {
                    product_id: product.id,
                    name: product.name,
                    quantity,
                    unit_price,
                    subtotal,
                });
                self.items.len() - 1
            }
        };
        Ok(&self.items[idx])
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.subtotal).sum()
    }

    /// Fill the header and lines from an existing note
    pub fn prefill_from(&mut self, template: &InboundNote) {
        self.number = template.number.clone();
        self.supplier = template.supplier_id.clone();
        self.date = Some(template.date);
        self.notes = template.notes.clone().unwrap_or_default();
        self.items = template
            .line_items
            .iter()
            .map(|line| {
                let unit_price = line.unit_price.unwrap_or(0.0);
                StagedInbound {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.available_quantity,
                    unit_price,
                    subtotal: line.available_quantity as f64 * unit_price,
                }
            })
            .collect();
    }

    /// Validate and store the note. On any error nothing is written and the
    /// draft is left as it was; on success the draft is cleared.
    pub fn submit(&mut self, storage: &LocalStorage, config: &StockflowConfig) -> Result<InboundReceipt> {
        if self.items.is_empty() {
            return Err(StockflowError::EmptyItems);
        }
        let supplier_name = self.supplier.trim();
        if supplier_name.is_empty() {
            return Err(StockflowError::MissingField("supplier"));
        }
        let number = self.number.trim();
        if number.is_empty() {
            return Err(StockflowError::MissingField("number"));
        }
        let date = self.date.ok_or(StockflowError::MissingField("date"))?;

        let notes = repository::inbound_notes(storage).snapshot()?;
        if notes.items.iter().any(|n| n.number == number) {
            return Err(StockflowError::DuplicateNoteNumber(number.to_string()));
        }

        let suppliers = repository::suppliers(storage).snapshot()?;
        let existing = suppliers
            .items
            .iter()
            .find(|s| s.id == supplier_name || s.matches_name(supplier_name))
            .cloned();
        let supplier_created = existing.is_none();
        let supplier = existing.unwrap_or_else(|| Supplier::new(supplier_name));

        let mut note = InboundNote::new(number, supplier.id.clone(), date);
        let extra = self.notes.trim();
        if !extra.is_empty() {
            note.notes = Some(extra.to_string());
        }
        note.line_items = self
            .items
            .iter()
            .map(|i| LineItem::received(&i.product_id, &i.name, i.quantity, Some(i.unit_price)))
            .collect();

        let mut tx = storage.transaction();
        if supplier_created {
            let mut all = suppliers.items;
            all.push(supplier.clone());
            tx.put(keys::SUPPLIERS, suppliers.version, &all)?;
        }
        let mut all = notes.items;
        all.push(note.clone());
        tx.put(keys::INBOUND_NOTES, notes.version, &all)?;
        tx.commit()?;

        tracing::info!(
            id = %note.id,
            number = %note.number,
            lines = note.line_items.len(),
            "registered inbound note"
        );

        *self = InboundDraft::new(chrono::Local::now().date_naive());
        Ok(InboundReceipt {
            note,
            supplier,
            supplier_created,
            redirect: Redirect::after(Route::Home, config.redirect_delay()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn filled_draft(storage: &LocalStorage, number: &str) -> InboundDraft {
        let mut draft = InboundDraft::new(day(1));
        draft.supplier = "Fornecedor X".to_string();
        draft.number = number.to_string();
        draft.add_item(storage, "Cimento", 10, 32.5).unwrap();
        draft
    }

    #[test]
    fn test_add_item_rejects_quantity_overflow() {
        let storage = LocalStorage::in_memory();
        let mut draft = InboundDraft::new(day(1));
        draft.add_item(&storage, "A", i64::MAX, 1.0).unwrap();

        let result = draft.add_item(&storage, "a", 1, 1.0);

        assert!(matches!(result, Err(StockflowError::InvalidQuantity { quantity: 1, .. })));
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.items()[0].quantity, i64::MAX);
    }

    #[test]
    fn test_add_item_creates_product_once() {
        let storage = LocalStorage::in_memory();
        let mut draft = InboundDraft::new(day(1));

        draft.add_item(&storage, "Cimento", 2, 30.0).unwrap();
        draft.add_item(&storage, "  cimento ", 3, 35.0).unwrap();

        assert_eq!(repository::products(&storage).list().unwrap().len(), 1);
        assert_eq!(draft.items().len(), 1);
        let item = &draft.items()[0];
        assert_eq!(item.quantity, 5);
        assert_eq!(item.unit_price, 35.0);
        // Cumulative: 2 x 30 + 3 x 35
        assert!((item.subtotal - 165.0).abs() < 1e-9);
        assert!((draft.total() - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_item_rejects_bad_input() {
        let storage = LocalStorage::in_memory();
        let mut draft = InboundDraft::new(day(1));

        assert!(matches!(
            draft.add_item(&storage, "  ", 1, 1.0),
            Err(StockflowError::MissingField("product"))
        ));
        assert!(matches!(
            draft.add_item(&storage, "Areia", 0, 1.0),
            Err(StockflowError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            draft.add_item(&storage, "Areia", 1, 0.0),
            Err(StockflowError::InvalidPrice(_))
        ));
        assert!(draft.items().is_empty());
        assert!(repository::products(&storage).list().unwrap().is_empty());
    }

    #[test]
    fn test_remove_item() {
        let storage = LocalStorage::in_memory();
        let mut draft = InboundDraft::new(day(1));
        let id = draft.add_item(&storage, "Tijolo", 100, 0.8).unwrap().product_id.clone();

        assert!(draft.remove_item(&id));
        assert!(!draft.remove_item(&id));
        assert_eq!(draft.total(), 0.0);
    }

    #[test]
    fn test_submit_persists_note_and_supplier() {
        let storage = LocalStorage::in_memory();
        let config = StockflowConfig::default();
        let mut draft = filled_draft(&storage, "001");
        draft.notes = "  primeira entrada ".to_string();

        let receipt = draft.submit(&storage, &config).unwrap();

        assert!(receipt.supplier_created);
        assert_eq!(receipt.redirect.to, Route::Home);
        assert_eq!(receipt.redirect.after, config.redirect_delay());

        let notes = repository::inbound_notes(&storage).list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].number, "001");
        assert_eq!(notes[0].supplier_id, receipt.supplier.id);
        assert_eq!(notes[0].notes.as_deref(), Some("primeira entrada"));
        assert_eq!(notes[0].line_items[0].available_quantity, 10);
        assert_eq!(notes[0].line_items[0].received_quantity, Some(10));
        assert_eq!(repository::suppliers(&storage).list().unwrap().len(), 1);

        // Draft is cleared
        assert!(draft.items().is_empty());
        assert!(draft.number.is_empty());
    }

    #[test]
    fn test_submit_reuses_supplier_case_insensitively() {
        let storage = LocalStorage::in_memory();
        let config = StockflowConfig::default();
        repository::suppliers(&storage)
            .append(Supplier::new("fornecedor x"))
            .unwrap();

        let receipt = filled_draft(&storage, "002").submit(&storage, &config).unwrap();

        assert!(!receipt.supplier_created);
        assert_eq!(repository::suppliers(&storage).list().unwrap().len(), 1);
    }

    #[test]
    fn test_submit_rejects_duplicate_number() {
        let storage = LocalStorage::in_memory();
        let config = StockflowConfig::default();
        filled_draft(&storage, "001").submit(&storage, &config).unwrap();
        let version = storage.version(keys::INBOUND_NOTES).unwrap();

        let mut again = filled_draft(&storage, "001");
        let result = again.submit(&storage, &config);

        assert!(matches!(result, Err(StockflowError::DuplicateNoteNumber(n)) if n == "001"));
        assert_eq!(repository::inbound_notes(&storage).list().unwrap().len(), 1);
        assert_eq!(storage.version(keys::INBOUND_NOTES).unwrap(), version);
        // Draft kept for correction
        assert_eq!(again.items().len(), 1);
    }

    #[test]
    fn test_submit_requires_items_and_header() {
        let storage = LocalStorage::in_memory();
        let config = StockflowConfig::default();

        let mut empty = InboundDraft::new(day(1));
        empty.supplier = "X".to_string();
        empty.number = "1".to_string();
        assert!(matches!(empty.submit(&storage, &config), Err(StockflowError::EmptyItems)));

        let mut no_supplier = filled_draft(&storage, "1");
        no_supplier.supplier.clear();
        assert!(matches!(
            no_supplier.submit(&storage, &config),
            Err(StockflowError::MissingField("supplier"))
        ));

        let mut no_date = filled_draft(&storage, "1");
        no_date.date = None;
        assert!(matches!(
            no_date.submit(&storage, &config),
            Err(StockflowError::MissingField("date"))
        ));

        assert!(repository::inbound_notes(&storage).list().unwrap().is_empty());
    }

    #[test]
    fn test_prefill_from_template() {
        let template = fixtures::template_for("10001").unwrap();
        let mut draft = InboundDraft::new(day(20));

        draft.prefill_from(&template);

        assert_eq!(draft.supplier, "Fornecedor X");
        assert_eq!(draft.date, Some(day(1)));
        assert_eq!(draft.items().len(), 2);
        // 50 x 10.5 + 30 x 25.0
        assert!((draft.total() - 1275.0).abs() < 1e-9);
    }
}
