//! Restock warnings.
//!
//! Raised after a stock-out leaves a product at or below the configured
//! thresholds, and by `stockflow stock`.

use crate::ledger::{StockLevel, StockStatus};

/// A warning about a product running out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Stock at or below the low threshold
    LowStock { name: String, quantity: i64 },
    /// Stock at or below the critical threshold
    CriticalStock { name: String, quantity: i64 },
}

/// Check levels and return any warnings.
///
/// # Arguments
/// * `levels` - Stock levels from `ledger::stock_levels`
///
/// # Returns
/// A vector of warnings (empty if every product is above the thresholds)
pub fn check_levels(levels: &[StockLevel]) -> Vec<Warning> {
    levels
        .iter()
        .filter_map(|level| match level.status {
            StockStatus::Ok => None,
            StockStatus::Low => Some(Warning::LowStock {
                name: level.name.clone(),
                quantity: level.quantity,
            }),
            StockStatus::Critical => Some(Warning::CriticalStock {
                name: level.name.clone(),
                quantity: level.quantity,
            }),
        })
        .collect()
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::LowStock { name, quantity } => {
            format!("Warning: {} is low on stock ({} left)", name, quantity)
        }
        Warning::CriticalStock { name, quantity } => {
            format!("Warning: {} is critically low ({} left)", name, quantity)
        }
    }
}
