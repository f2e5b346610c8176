//! # Core Type Definitions
//!
//! This module contains the cart data model:
//! - Product identifiers (`ProductId`) and quantities (`Quantity`)
//! - Line items (`LineItem`, and `NewLineItem` for items not yet in a cart)
//! - Mutation reports (`CartChange`)
//! - Error types (`CartError`)
//!
//! Field names are part of the persisted format: `id`, `title`, `image_url`,
//! `price`, `quantity`. Renaming a field breaks every stored cart.

use crate::primitives::{MAX_IMAGE_URL_LENGTH, MAX_PRODUCT_ID_LENGTH, MAX_TITLE_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of a product. Unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// QUANTITY
// =============================================================================

/// Number of units of one product in the cart.
///
/// A quantity held by a cart is always at least one. Zero is representable
/// only so that decoding can detect and reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub u32);

impl Quantity {
    /// Quantity of a freshly added line item.
    pub const ONE: Self = Self(1);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Add one unit using saturating arithmetic.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Remove one unit. Returns `None` when the quantity would reach zero,
    /// meaning the line item must leave the cart.
    #[must_use]
    pub const fn decrement(self) -> Option<Self> {
        if self.0 <= 1 {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// LINE ITEMS
// =============================================================================

/// One product entry in the cart plus the selected quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: Quantity,
}

impl LineItem {
    /// Copy of this item with a different quantity. All other fields are kept.
    #[must_use]
    pub fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// A product offered to `add_to_cart`: a line item without a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turn the product into the first unit of a line item.
    #[must_use]
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: Quantity::ONE,
        }
    }

    /// Validate a product coming from outside the process.
    ///
    /// `CartStore` itself accepts any item; consumers call this at their
    /// boundary (HTTP body, CLI arguments) before handing items over.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CartError::InvalidItem("id must not be empty".to_string()));
        }
        check_length("id", self.id.as_str(), MAX_PRODUCT_ID_LENGTH)?;
        check_length("title", &self.title, MAX_TITLE_LENGTH)?;
        check_length("image_url", &self.image_url, MAX_IMAGE_URL_LENGTH)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CartError::InvalidItem(format!(
                "price must be a finite, non-negative number (got {})",
                self.price
            )));
        }
        Ok(())
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), CartError> {
    if value.len() > max {
        return Err(CartError::InvalidItem(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            value.len(),
            max
        )));
    }
    Ok(())
}

// =============================================================================
// CART CHANGE
// =============================================================================

/// What a single mutation did to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartChange {
    /// A new line item was appended with quantity one.
    Added { id: ProductId },
    /// An existing line item gained one unit.
    Incremented { id: ProductId, quantity: Quantity },
    /// An existing line item lost one unit and is still in the cart.
    Decremented { id: ProductId, quantity: Quantity },
    /// The last unit was taken away; the line item left the cart.
    Removed { id: ProductId },
    /// No line item matched the id.
    Unchanged { id: ProductId },
}

impl CartChange {
    /// The product the mutation was addressed to.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Added { id }
            | Self::Incremented { id, .. }
            | Self::Decremented { id, .. }
            | Self::Removed { id }
            | Self::Unchanged { id } => id,
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Unchanged { .. })
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the cart.
///
/// Looking up an unknown id is not an error: increment and decrement report
/// `CartChange::Unchanged` instead.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was accessed without a mounted `CartProvider`.
    #[error("{accessor} must be used within a CartProvider")]
    OutsideProvider { accessor: &'static str },

    /// A product failed boundary validation.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Stored data could not be decoded into a valid cart.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// The key-value backend failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The change was applied in memory but writing the cart failed.
    ///
    /// The in-memory cart keeps the change; the stored value is stale until
    /// the next successful write.
    #[error("Cart updated ({change:?}) but not persisted: {reason}")]
    PersistFailed { change: CartChange, reason: String },

    /// A writer panicked while holding the cart lock.
    #[error("Cart state lock poisoned")]
    StatePoisoned,
}

// =============================================================================
// TESTS
// =============================================================================
