//! Stock-out: staging quantities against one inbound note and committing
//! the decrement together with the movement record.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::StockflowConfig;
use crate::entity::{InboundNote, LineItem, OutboundItem, OutboundMovement};
use crate::error::{Result, StockflowError};
use crate::ledger;
use crate::repository;
use crate::route::{Redirect, Route};
use crate::storage::{keys, LocalStorage};

#[derive(Debug, Clone)]
pub struct OutboundReceipt {
    pub movement: OutboundMovement,
    /// The inbound note after the decrement
    pub note: InboundNote,
    pub redirect: Redirect,
}

#[derive(Debug, Clone)]
struct SelectedNote {
    note: InboundNote,
    /// Version of the notes collection when the note was loaded
    base_version: u64,
}

/// The stock-out form
#[derive(Debug, Clone, Default)]
pub struct OutboundDraft {
    selected: Option<SelectedNote>,
    quantities: HashMap<String, i64>,
    staged: Vec<OutboundItem>,
    pub date: Option<NaiveDate>,
    pub reason: String,
    pub recipient: String,
    pub notes: String,
}

/// Notes that can be picked: at least one line with stock left
pub fn selectable_notes(storage: &LocalStorage) -> Result<Vec<InboundNote>> {
    let notes = repository::inbound_notes(storage).list()?;
    Ok(ledger::notes_with_stock(&notes).into_iter().cloned().collect())
}

impl OutboundDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: Some(today),
            ..Default::default()
        }
    }

    /// Load a note's lines as candidates. Clears anything staged.
    pub fn select_note(&mut self, storage: &LocalStorage, note_id: &str) -> Result<&InboundNote> {
        let snapshot = repository::inbound_notes(storage).snapshot()?;
        let note = snapshot
            .find(note_id)
            .cloned()
            .ok_or_else(|| StockflowError::EntityNotFound(note_id.to_string()))?;
        if !note.has_stock() {
            return Err(StockflowError::NoStockAvailable(note.number));
        }

        self.staged.clear();
        self.quantities.clear();
        let selected = self.selected.insert(SelectedNote {
            note,
            base_version: snapshot.version,
        });
        Ok(&selected.note)
    }

    pub fn selected_note(&self) -> Option<&InboundNote> {
        self.selected.as_ref().map(|s| &s.note)
    }

    /// Lines of the selected note
    pub fn candidates(&self) -> &[LineItem] {
        self.selected
            .as_ref()
            .map(|s| s.note.line_items.as_slice())
            .unwrap_or_default()
    }

    /// Desired quantity for a product row. Ignored for staged rows.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        if self.is_editable(product_id) {
            self.quantities.insert(product_id.to_string(), quantity);
        }
    }

    pub fn quantity(&self, product_id: &str) -> i64 {
        self.quantities.get(product_id).copied().unwrap_or(0)
    }

    /// Staged rows are locked until unstaged
    pub fn is_editable(&self, product_id: &str) -> bool {
        !self.staged.iter().any(|i| i.product_id() == product_id)
    }

    pub fn staged(&self) -> &[OutboundItem] {
        &self.staged
    }

    /// Commit one row to the movement summary
    pub fn stage(&mut self, product_id: &str) -> Result<&OutboundItem> {
        let line = self
            .candidates()
            .iter()
            .find(|l| l.product_id == product_id)
            .cloned()
            .ok_or_else(|| StockflowError::EntityNotFound(product_id.to_string()))?;

        let quantity = self.quantity(product_id);
        if quantity <= 0 || quantity > line.available_quantity {
            return Err(StockflowError::InvalidQuantity {
                product: line.name,
                quantity,
            });
        }
        if !self.is_editable(product_id) {
            return Err(StockflowError::AlreadyStaged(line.name));
        }

        self.staged.push(OutboundItem::new(line, quantity));
        Ok(&self.staged[self.staged.len() - 1])
    }

    /// Withdraw a staged row, making it editable again
    pub fn unstage(&mut self, product_id: &str) -> bool {
        let before = self.staged.len();
        self.staged.retain(|i| i.product_id() != product_id);
        self.staged.len() != before
    }

    /// Validate, then write the decremented note and the new movement in one
    /// transaction. Fails with [`StockflowError::StaleWrite`] if the notes
    /// changed since the note was selected; nothing is written in that case.
    pub fn submit(&mut self, storage: &LocalStorage, config: &StockflowConfig) -> Result<OutboundReceipt> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(StockflowError::MissingField("reason"));
        }
        let selected = self
            .selected
            .as_ref()
            .ok_or(StockflowError::MissingField("note"))?;
        let date = self.date.ok_or(StockflowError::MissingField("date"))?;
        if self.staged.is_empty() {
            return Err(StockflowError::EmptyItems);
        }
        if let Some(bad) = self.staged.iter().find(|i| !i.is_within_stock()) {
            return Err(StockflowError::InvalidQuantity {
                product: bad.line.name.clone(),
                quantity: bad.outbound_quantity,
            });
        }

        let mut notes = repository::inbound_notes(storage).list()?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == selected.note.id)
            .ok_or_else(|| StockflowError::EntityNotFound(selected.note.id.clone()))?;
        for line in note.line_items.iter_mut() {
            if let Some(item) = self.staged.iter().find(|i| i.product_id() == line.product_id) {
                line.available_quantity -= item.outbound_quantity;
            }
        }
        let updated = note.clone();

        let mut movement = OutboundMovement::new(&selected.note.id, date, reason);
        movement.recipient = non_empty(&self.recipient);
        movement.notes = non_empty(&self.notes);
        movement.items = self.staged.clone();

        let movements = repository::outbound_movements(storage).snapshot()?;
        let mut all_movements = movements.items;
        all_movements.push(movement.clone());

        let mut tx = storage.transaction();
        tx.put(keys::INBOUND_NOTES, selected.base_version, &notes)?;
        tx.put(keys::OUTBOUND_MOVEMENTS, movements.version, &all_movements)?;
        tx.commit()?;

        tracing::info!(
            id = %movement.id,
            note = %updated.number,
            items = movement.items.len(),
            quantity = movement.total_quantity(),
            "registered stock-out"
        );

        *self = OutboundDraft::new(chrono::Local::now().date_naive());
        Ok(OutboundReceipt {
            movement,
            note: updated,
            redirect: Redirect::after(Route::Home, config.redirect_delay()),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
