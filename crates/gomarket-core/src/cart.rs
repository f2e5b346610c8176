//! # Cart
//!
//! The ordered collection of line items and its pure transformations.
//!
//! A `Cart` is never edited in place. Each transformation returns a new
//! `Cart` together with the `CartChange` it performed, so a snapshot handed
//! to a consumer stays exactly as it was when taken. `CartStore` is the only
//! place where a transformed cart becomes the authoritative one.
//!
//! Invariants held by every `Cart`:
//! - insertion order is preserved; new products go to the end
//! - no two line items share an id
//! - every quantity is at least one

use crate::{CartChange, CartError, LineItem, NewLineItem, ProductId};
use serde::Serialize;
use std::collections::BTreeSet;

/// Ordered, id-unique sequence of line items.
///
/// Serializes as a plain JSON array of line items. There is deliberately no
/// `Deserialize` impl: decoded data must go through [`Cart::try_from_items`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from decoded line items, checking the invariants.
    ///
    /// Rejects duplicate ids and zero quantities.
    pub fn try_from_items(items: Vec<LineItem>) -> Result<Self, CartError> {
        let mut seen = BTreeSet::new();
        for item in &items {
            if item.quantity.is_zero() {
                return Err(CartError::DeserializationError(format!(
                    "line item '{}' has quantity 0",
                    item.id
                )));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CartError::DeserializationError(format!(
                    "duplicate line item id '{}'",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line item by product id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    fn find(&self, id: &str) -> Option<(usize, &LineItem)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, item)| item.id.as_str() == id)
    }

    /// A fresh copy of the items with the one at `index` swapped out.
    fn replaced(&self, index: usize, replacement: LineItem) -> Vec<LineItem> {
        let mut items = self.items.clone();
        if let Some(slot) = items.get_mut(index) {
            *slot = replacement;
        }
        items
    }

    fn bumped(&self, index: usize, existing: &LineItem) -> (Self, CartChange) {
        let quantity = existing.quantity.increment();
        let items = self.replaced(index, existing.with_quantity(quantity));
        let change = CartChange::Incremented {
            id: existing.id.clone(),
            quantity,
        };
        (Self { items }, change)
    }

    // =========================================================================
    // TRANSFORMATIONS
    // =========================================================================

    /// Add one unit of `product`.
    ///
    /// If a line item with the same id exists, only its quantity changes;
    /// the title, image and price already in the cart are kept and the ones
    /// supplied with `product` are ignored. Otherwise the product is appended
    /// with quantity one.
    #[must_use]
    pub fn with_added(&self, product: NewLineItem) -> (Self, CartChange) {
        if let Some((index, existing)) = self.find(product.id.as_str()) {
            return self.bumped(index, existing);
        }

        let id = product.id.clone();
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(product.into_line_item());
        (Self { items }, CartChange::Added { id })
    }

    /// Add one unit to an existing line item.
    ///
    /// An unknown id leaves the cart as it is and reports
    /// `CartChange::Unchanged`; no line item is created.
    #[must_use]
    pub fn with_incremented(&self, id: &str) -> (Self, CartChange) {
        match self.find(id) {
            Some((index, existing)) => self.bumped(index, existing),
            None => (self.clone(), unchanged(id)),
        }
    }

    /// Take one unit away from an existing line item.
    ///
    /// The line item is removed when its last unit goes. An unknown id
    /// leaves the cart as it is.
    #[must_use]
    pub fn with_decremented(&self, id: &str) -> (Self, CartChange) {
        let Some((index, existing)) = self.find(id) else {
            return (self.clone(), unchanged(id));
        };

        match existing.quantity.decrement() {
            Some(quantity) => {
                let items = self.replaced(index, existing.with_quantity(quantity));
                let change = CartChange::Decremented {
                    id: existing.id.clone(),
                    quantity,
                };
                (Self { items }, change)
            }
            None => {
                let change = CartChange::Removed {
                    id: existing.id.clone(),
                };
                let mut items = self.items.clone();
                items.remove(index);
                (Self { items }, change)
            }
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn unchanged(id: &str) -> CartChange {
    CartChange::Unchanged {
        id: ProductId::new(id),
    }
}

// =============================================================================
// TESTS
// =============================================================================
