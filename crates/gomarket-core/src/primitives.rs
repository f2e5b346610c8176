//! # Cart Primitives
//!
//! Fixed constants of the cart. They are compiled into the binary and are
//! immutable at runtime.

/// The single key under which the whole cart is stored.
///
/// Every backend keeps the cart as one opaque value under this key.
/// Changing it orphans all previously saved carts.
pub const CART_STORAGE_KEY: &str = "@GoMarket:products";

/// Maximum size of a stored cart snapshot (16 MB).
///
/// Checked before parsing so a corrupted or hostile value cannot force a
/// large allocation.
pub const MAX_SNAPSHOT_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a product id, in bytes.
pub const MAX_PRODUCT_ID_LENGTH: usize = 256;

/// Maximum length of a product title, in bytes.
pub const MAX_TITLE_LENGTH: usize = 1024;

/// Maximum length of a product image URL, in bytes.
pub const MAX_IMAGE_URL_LENGTH: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_stable() {
        assert_eq!(CART_STORAGE_KEY, "@GoMarket:products");
    }
}
