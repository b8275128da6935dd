//! Demo data: ten inbound notes over ten products and three suppliers.
//!
//! Used by `stockflow seed` and as templates when a typed note number
//! matches one of them.

use chrono::NaiveDate;

use crate::entity::{InboundNote, LineItem, Product, Supplier};
use crate::error::Result;
use crate::repository;
use crate::storage::LocalStorage;

const PRODUCTS: [(&str, &str, f64); 10] = [
    ("p1", "Produto A", 10.5),
    ("p2", "Produto B", 25.0),
    ("p3", "Produto C", 15.75),
    ("p4", "Produto D", 8.9),
    ("p5", "Produto E", 12.0),
    ("p6", "Produto F", 30.0),
    ("p7", "Produto G", 7.5),
    ("p8", "Produto H", 22.0),
    ("p9", "Produto I", 18.0),
    ("p10", "Produto J", 9.99),
];

const SUPPLIERS: [&str; 3] = ["Fornecedor X", "Fornecedor Y", "Fornecedor Z"];

// (number, supplier index, day of June 2024, [(product index, quantity)])
const NOTES: [(&str, usize, u32, [(usize, i64); 2]); 10] = [
    ("10001", 0, 1, [(0, 50), (1, 30)]),
    ("10002", 1, 2, [(2, 20), (3, 10)]),
    ("10003", 2, 3, [(4, 15), (0, 5)]),
    ("10004", 0, 4, [(1, 12), (5, 8)]),
    ("10005", 1, 5, [(6, 25), (2, 7)]),
    ("10006", 2, 6, [(7, 18), (3, 6)]),
    ("10007", 0, 7, [(8, 22), (4, 9)]),
    ("10008", 1, 8, [(9, 14), (5, 11)]),
    ("10009", 2, 9, [(0, 13), (6, 4)]),
    ("10010", 0, 10, [(1, 17), (7, 3)]),
];

pub fn demo_products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(|(id, name, _)| Product {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Supplier ids are their names, as in data created by older front ends
pub fn demo_suppliers() -> Vec<Supplier> {
    SUPPLIERS
        .iter()
        .map(|name| Supplier {
            id: name.to_string(),
            name: name.to_string(),
        })
        .collect()
}

pub fn demo_notes() -> Vec<InboundNote> {
    NOTES
        .iter()
        .enumerate()
        .map(|(idx, (number, supplier, day, lines))| {
            let date = NaiveDate::from_ymd_opt(2024, 6, *day).unwrap_or_default();
            let mut note = InboundNote::new(*number, SUPPLIERS[*supplier], date);
            note.id = format!("n{}", idx + 1);
            note.notes = Some(format!("Nota teste {}", idx + 1));
            note.line_items = lines
                .iter()
                .map(|(product, qty)| {
                    let (id, name, price) = PRODUCTS[*product];
                    LineItem::received(id, name, *qty, Some(price))
                })
                .collect();
            note
        })
        .collect()
}

/// Demo note with this number, if any
pub fn template_for(number: &str) -> Option<InboundNote> {
    demo_notes().into_iter().find(|n| n.number == number)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub products: usize,
    pub suppliers: usize,
    pub notes: usize,
}

/// Add the demo records that are not stored yet (matched by id, and by
/// number for notes)
pub fn seed(storage: &LocalStorage) -> Result<SeedStats> {
    let mut stats = SeedStats::default();

    let products = repository::products(storage);
    let mut snapshot = products.snapshot()?;
    for product in demo_products() {
        if snapshot.find(&product.id).is_none() {
            snapshot.items.push(product);
            stats.products += 1;
        }
    }
    if stats.products > 0 {
        products.commit(snapshot)?;
    }

    let suppliers = repository::suppliers(storage);
    let mut snapshot = suppliers.snapshot()?;
    for supplier in demo_suppliers() {
        if snapshot.find(&supplier.id).is_none() {
            snapshot.items.push(supplier);
            stats.suppliers += 1;
        }
    }
    if stats.suppliers > 0 {
        suppliers.commit(snapshot)?;
    }

    let notes = repository::inbound_notes(storage);
    let mut snapshot = notes.snapshot()?;
    for note in demo_notes() {
        let taken = snapshot
            .items
            .iter()
            .any(|n| n.id == note.id || n.number == note.number);
        if !taken {
            snapshot.items.push(note);
            stats.notes += 1;
        }
    }
    if stats.notes > 0 {
        notes.commit(snapshot)?;
    }

    tracing::info!(?stats, "seeded demo data");
    Ok(stats)
}
