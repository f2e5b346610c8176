//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::totals::CartTotals;
use gomarket_core::{CartChange, CartError, LineItem, NewLineItem};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ADD PRODUCT REQUEST
// =============================================================================

/// Product to put in the cart. Quantity is never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddProductRequest {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl AddProductRequest {
    /// Convert to a `NewLineItem`, validating fields.
    ///
    /// Rejects blank ids, oversized text fields and prices that are
    /// negative or not finite.
    pub fn to_new_item(&self) -> Result<NewLineItem, CartError> {
        let item = NewLineItem::new(
            self.id.as_str(),
            self.title.as_str(),
            self.image_url.as_str(),
            self.price,
        );
        item.validate()?;
        Ok(item)
    }
}

// =============================================================================
// CART RESPONSE
// =============================================================================

/// Cart contents plus display totals.
///
/// Returned by `GET /cart` and by every mutation. Mutations also carry the
/// `change` they applied. On a failed write `success` is false but the
/// products still show what the cart holds in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<CartChange>,
    pub products: Vec<LineItem>,
    pub total_items: u64,
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CartResponse {
    /// Current cart, no change attached.
    #[must_use]
    pub fn snapshot(products: Vec<LineItem>) -> Self {
        Self::build(true, None, products, None)
    }

    /// Cart after a successful mutation.
    #[must_use]
    pub fn changed(change: CartChange, products: Vec<LineItem>) -> Self {
        Self::build(true, Some(change), products, None)
    }

    /// Failure with no cart to show.
    #[must_use]
    pub fn error(message: String) -> Self {
        Self::build(false, None, Vec::new(), Some(message))
    }

    /// Failure that still reports the in-memory cart.
    #[must_use]
    pub fn error_with_products(
        message: String,
        change: CartChange,
        products: Vec<LineItem>,
    ) -> Self {
        Self::build(false, Some(change), products, Some(message))
    }

    fn build(
        success: bool,
        change: Option<CartChange>,
        products: Vec<LineItem>,
        error: Option<String>,
    ) -> Self {
        let totals = CartTotals::from_items(&products);
        Self {
            success,
            change,
            products,
            total_items: totals.total_items,
            total_price: totals.total_price,
            error,
        }
    }
}
