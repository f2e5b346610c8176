//! # Cart Totals
//!
//! Display aggregates for a cart screen. The core never sums prices;
//! consumers do it here, from a snapshot.

use gomarket_core::LineItem;
use serde::{Deserialize, Serialize};

/// Item count and price total of a list of line items.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of all quantities.
    pub total_items: u64,
    /// Sum of `price * quantity`.
    pub total_price: f64,
}

impl CartTotals {
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| {
            let quantity = item.quantity.value();
            Self {
                total_items: acc.total_items + u64::from(quantity),
                total_price: acc.total_price + item.price * f64::from(quantity),
            }
        })
    }
}
