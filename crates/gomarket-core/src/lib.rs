//! # gomarket-core
//!
//! The persisted shopping cart for GoMarket - THE CART.
//!
//! This crate keeps an ordered list of line items (product + quantity) in
//! memory and mirrors it, as one value under one fixed key, into a durable
//! key-value backend.
//!
//! ## Pieces
//!
//! - `types`: line items, quantities, change reports, errors
//! - `cart`: the `Cart` collection and its pure transformations
//! - `formats`: the JSON snapshot encoding
//! - `storage`: key-value backends (memory, JSON file, redb)
//! - `store`: `CartStore`, the single writer that applies and persists changes
//! - `provider`: `CartProvider` / `use_cart`, scoped access for consumers
//!
//! ## Architectural Constraints
//!
//! - Only `add_to_cart`, `increment` and `decrement` change the cart
//! - Every completed change is written back as the whole cart
//! - Totals and prices are computed by consumers, never here
//! - Has NO async, NO network dependencies (pure Rust)
//!
//! ## Example
//!
//! ```
//! use gomarket_core::{CartProvider, NewLineItem, storage::MemoryStore, use_cart};
//!
//! let provider = CartProvider::mount(MemoryStore::new()).expect("mount");
//! let cart = use_cart(&provider.context()).expect("inside provider");
//!
//! cart.add_to_cart(NewLineItem::new("1", "Apple", "https://img/apple.png", 2.5))
//!     .expect("add");
//! cart.increment("1").expect("increment");
//!
//! let products = cart.products().expect("read");
//! assert_eq!(products[0].quantity.value(), 2);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod cart;
pub mod formats;
pub mod primitives;
pub mod provider;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use cart::Cart;
pub use formats::{cart_from_bytes, cart_to_bytes};
pub use provider::{CartContext, CartHandle, CartProvider, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore, RedbStore, StorageBackend};
pub use store::CartStore;
pub use types::{CartChange, CartError, LineItem, NewLineItem, ProductId, Quantity};
