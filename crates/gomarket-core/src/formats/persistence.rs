//! # Persistence Format
//!
//! Encoding of a cart as the value stored under [`CART_STORAGE_KEY`].
//!
//! Format: a UTF-8 JSON array of line item objects, in cart order, with the
//! fields `id`, `title`, `image_url`, `price` and `quantity`. There is no
//! header, version field or schema tag; the whole value is replaced on every
//! write.
//!
//! Decoding validates before and after parsing:
//! - payload size (`MAX_SNAPSHOT_SIZE`) before any allocation
//! - cart invariants (unique ids, quantity >= 1) after parsing
//!
//! [`CART_STORAGE_KEY`]: crate::primitives::CART_STORAGE_KEY

use crate::primitives::MAX_SNAPSHOT_SIZE;
use crate::{Cart, CartError, LineItem};

/// Serialize a cart to bytes.
///
/// This is a pure transformation - no I/O. Fails if a price is not finite,
/// since JSON cannot carry it back.
pub fn cart_to_bytes(cart: &Cart) -> Result<Vec<u8>, CartError> {
    if let Some(item) = cart.iter().find(|item| !item.price.is_finite()) {
        return Err(CartError::SerializationError(format!(
            "line item '{}' has a non-finite price",
            item.id
        )));
    }
    serde_json::to_vec(cart).map_err(|e| CartError::SerializationError(e.to_string()))
}

/// Deserialize a cart from bytes.
///
/// This is a pure transformation - no I/O.
pub fn cart_from_bytes(bytes: &[u8]) -> Result<Cart, CartError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(CartError::DeserializationError(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let items: Vec<LineItem> = serde_json::from_slice(bytes).map_err(|e| {
        CartError::DeserializationError(format!("Failed to parse cart snapshot: {}", e))
    })?;

    Cart::try_from_items(items)
}

// =============================================================================
// TESTS
// =============================================================================
