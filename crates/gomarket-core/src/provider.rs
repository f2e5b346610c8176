//! # Cart Provider
//!
//! Scoped access to a shared `CartStore`.
//!
//! A `CartProvider` owns the store for as long as it is mounted. Consumers
//! never hold the provider itself; they receive a `CartContext`, a weak
//! reference threaded through their call sites, and turn it into a
//! `CartHandle` with [`use_cart`] when they need the cart.
//!
//! `use_cart` fails with `CartError::OutsideProvider` when the context was
//! never attached to a provider or the provider has been dropped. This
//! catches consumers that reach for the cart before the store exists.
//!
//! Handles serialize every call through one lock, so overlapping callers
//! are applied one at a time, each against the latest committed cart.

use crate::storage::{KeyValueStore, StorageBackend};
use crate::{Cart, CartChange, CartError, CartStore, LineItem, NewLineItem};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type SharedStore<S> = Arc<RwLock<CartStore<S>>>;

// =============================================================================
// PROVIDER
// =============================================================================

/// Owner of the shared cart store. Dropping it ends the scope.
pub struct CartProvider<S: KeyValueStore = StorageBackend> {
    store: SharedStore<S>,
}

impl<S: KeyValueStore> CartProvider<S> {
    /// Open a store over `backend`, load its snapshot and start the scope.
    pub fn mount(backend: S) -> Result<Self, CartError> {
        CartStore::open(backend).map(Self::with_store)
    }

    /// Start a scope around an existing store.
    #[must_use]
    pub fn with_store(store: CartStore<S>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// A context that resolves to this provider's store while it is mounted.
    #[must_use]
    pub fn context(&self) -> CartContext<S> {
        CartContext {
            store: Arc::downgrade(&self.store),
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for CartProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartProvider").finish_non_exhaustive()
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Weak reference to a provider's store.
///
/// `CartContext::default()` is detached: it belongs to no provider and every
/// `use_cart` on it fails.
pub struct CartContext<S: KeyValueStore = StorageBackend> {
    store: Weak<RwLock<CartStore<S>>>,
}

impl<S: KeyValueStore> CartContext<S> {
    /// Whether a provider currently backs this context.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.store.strong_count() > 0
    }
}

impl<S: KeyValueStore> Default for CartContext<S> {
    fn default() -> Self {
        Self { store: Weak::new() }
    }
}

impl<S: KeyValueStore> Clone for CartContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Weak::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for CartContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartContext")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// Resolve `context` to the cart of its mounted provider.
///
/// # Errors
///
/// `CartError::OutsideProvider` if no provider backs the context.
pub fn use_cart<S: KeyValueStore>(context: &CartContext<S>) -> Result<CartHandle<S>, CartError> {
    context
        .store
        .upgrade()
        .map(|store| CartHandle { store })
        .ok_or(CartError::OutsideProvider {
            accessor: "use_cart",
        })
}

// =============================================================================
// HANDLE
// =============================================================================

/// Access to the cart API of a mounted provider.
///
/// A handle keeps the store alive while it exists; keep it for the duration
/// of one request or command, not longer.
pub struct CartHandle<S: KeyValueStore = StorageBackend> {
    store: SharedStore<S>,
}

impl<S: KeyValueStore> CartHandle<S> {
    /// Copy of the current line items.
    pub fn products(&self) -> Result<Vec<LineItem>, CartError> {
        Ok(self.read()?.products().to_vec())
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Result<Cart, CartError> {
        Ok(self.read()?.snapshot())
    }

    pub fn add_to_cart(&self, product: NewLineItem) -> Result<CartChange, CartError> {
        self.write()?.add_to_cart(product)
    }

    pub fn increment(&self, id: &str) -> Result<CartChange, CartError> {
        self.write()?.increment(id)
    }

    pub fn decrement(&self, id: &str) -> Result<CartChange, CartError> {
        self.write()?.decrement(id)
    }

    /// Retry writing the current cart after a `PersistFailed`.
    pub fn flush(&self) -> Result<(), CartError> {
        self.write()?.flush()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CartStore<S>>, CartError> {
        self.store.read().map_err(|_| CartError::StatePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CartStore<S>>, CartError> {
        self.store.write().map_err(|_| CartError::StatePoisoned)
    }
}

impl<S: KeyValueStore> fmt::Debug for CartHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartHandle").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
