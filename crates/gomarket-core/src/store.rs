//! # Cart Store
//!
//! `CartStore` owns the authoritative cart and keeps it in sync with a
//! key-value backend. It is the only writer of [`CART_STORAGE_KEY`].
//!
//! ## Lifecycle
//!
//! 1. `CartStore::new` creates an empty store that has not read the backend.
//! 2. `hydrate` reads the stored snapshot once. Missing data gives an empty
//!    cart; malformed data is logged and also gives an empty cart.
//! 3. `add_to_cart`, `increment` and `decrement` replace the cart and write
//!    the whole snapshot back.
//!
//! Reads made between steps 1 and 2 see an empty cart. `CartStore::open`
//! performs both steps at once and is what consumers normally use. A
//! mutation on a store that has not been hydrated hydrates it first, so a
//! write never clobbers a snapshot it has not read.
//!
//! ## Write failures
//!
//! A mutation is applied in memory before the snapshot is written. If the
//! write fails the change stays applied, the failure is logged, and the
//! caller gets `CartError::PersistFailed` carrying the change. Nothing is
//! rolled back or retried; the next successful write (any mutation, or
//! `flush`) stores the full cart again.
//!
//! [`CART_STORAGE_KEY`]: crate::primitives::CART_STORAGE_KEY

use crate::formats::{cart_from_bytes, cart_to_bytes};
use crate::primitives::CART_STORAGE_KEY;
use crate::storage::{KeyValueStore, StorageBackend};
use crate::{Cart, CartChange, CartError, LineItem, NewLineItem};

/// The authoritative cart plus the backend it is persisted to.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore = StorageBackend> {
    backend: S,
    cart: Cart,
    hydrated: bool,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create an empty store over `backend` without reading it.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            cart: Cart::new(),
            hydrated: false,
        }
    }

    /// Create a store and load the persisted snapshot.
    pub fn open(backend: S) -> Result<Self, CartError> {
        let mut store = Self::new(backend);
        store.hydrate()?;
        Ok(store)
    }

    /// Load the persisted snapshot, once.
    ///
    /// Calling this on an already hydrated store does nothing. A backend
    /// read failure is returned and leaves the store unhydrated; a value that
    /// cannot be decoded, or a backend whose stored data cannot be parsed, is
    /// treated as "no data".
    pub fn hydrate(&mut self) -> Result<(), CartError> {
        if self.hydrated {
            return Ok(());
        }

        let stored = match self.backend.get(CART_STORAGE_KEY) {
            Ok(stored) => stored.map(|bytes| cart_from_bytes(&bytes)),
            // The backend's own container is unreadable: same as a bad snapshot.
            Err(e @ CartError::DeserializationError(_)) => Some(Err(e)),
            Err(e) => return Err(e),
        };

        self.cart = match stored {
            Some(Ok(cart)) => cart,
            Some(Err(e)) => {
                tracing::warn!(
                    key = CART_STORAGE_KEY,
                    error = %e,
                    "Discarding unreadable cart snapshot"
                );
                Cart::new()
            }
            None => Cart::new(),
        };
        self.hydrated = true;

        tracing::debug!(items = self.cart.len(), "Cart hydrated");
        Ok(())
    }

    /// Whether the persisted snapshot has been loaded.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    // =========================================================================
    // SNAPSHOT ACCESS
    // =========================================================================

    /// The current line items, in insertion order.
    #[must_use]
    pub fn products(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// An owned copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// Get a reference to the backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Add one unit of `product`, appending it if it is not in the cart yet.
    ///
    /// A product whose price is not finite cannot be stored and is refused
    /// with `InvalidItem` before the cart is touched.
    pub fn add_to_cart(&mut self, product: NewLineItem) -> Result<CartChange, CartError> {
        if !product.price.is_finite() {
            return Err(CartError::InvalidItem(format!(
                "price of '{}' must be finite (got {})",
                product.id, product.price
            )));
        }
        self.hydrate()?;
        let (next, change) = self.cart.with_added(product);
        self.commit(next, change)
    }

    /// Add one unit to the line item `id`. Unknown ids change nothing.
    pub fn increment(&mut self, id: &str) -> Result<CartChange, CartError> {
        self.hydrate()?;
        let (next, change) = self.cart.with_incremented(id);
        self.commit(next, change)
    }

    /// Take one unit from the line item `id`, removing it at zero.
    /// Unknown ids change nothing.
    pub fn decrement(&mut self, id: &str) -> Result<CartChange, CartError> {
        self.hydrate()?;
        let (next, change) = self.cart.with_decremented(id);
        self.commit(next, change)
    }

    /// Write the current cart to the backend.
    ///
    /// Mutations call this themselves. It is public so a caller that got
    /// `PersistFailed` can try again.
    pub fn flush(&mut self) -> Result<(), CartError> {
        let bytes = cart_to_bytes(&self.cart)?;
        self.backend.set(CART_STORAGE_KEY, &bytes)
    }

    // The snapshot is written even when `change` is a no-op, so the stored
    // value always matches memory after a mutation returns `Ok`.
    fn commit(&mut self, next: Cart, change: CartChange) -> Result<CartChange, CartError> {
        self.cart = next;
        tracing::debug!(?change, items = self.cart.len(), "Cart updated");

        match self.flush() {
            Ok(()) => Ok(change),
            Err(e) => {
                tracing::error!(
                    key = CART_STORAGE_KEY,
                    error = %e,
                    ?change,
                    "Cart change applied in memory but not persisted"
                );
                Err(CartError::PersistFailed {
                    change,
                    reason: e.to_string(),
                })
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::{ProductId, Quantity};

    /// Memory store whose reads or writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: bool,
        writes: usize,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
            if self.fail_reads {
                return Err(CartError::IoError("read refused".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
            if self.fail_writes {
                return Err(CartError::IoError("disk full".to_string()));
            }
            self.writes += 1;
            self.inner.set(key, value)
        }
    }

    fn apple() -> NewLineItem {
        NewLineItem::new("1", "Apple", "u", 2.5)
    }

    fn stored_cart<S: KeyValueStore>(store: &CartStore<S>) -> Cart {
        let bytes = store
            .backend()
            .get(CART_STORAGE_KEY)
            .expect("get")
            .expect("snapshot present");
        cart_from_bytes(&bytes).expect("decode")
    }

    #[test]
    fn new_store_is_empty_and_unhydrated() {
        let store = CartStore::new(MemoryStore::new());
        assert!(!store.is_hydrated());
        assert!(store.products().is_empty());
    }

    #[test]
    fn reads_before_hydrate_see_empty_cart() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                CART_STORAGE_KEY,
                br#"[{"id":"1","title":"Apple","image_url":"u","price":2.5,"quantity":4}]"#,
            )
            .expect("seed");

        let mut store = CartStore::new(backend);
        assert!(store.products().is_empty());

        store.hydrate().expect("hydrate");
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.cart().get("1").map(|i| i.quantity.value()), Some(4));
    }

    #[test]
    fn malformed_snapshot_hydrates_empty() {
        let mut backend = MemoryStore::new();
        backend.set(CART_STORAGE_KEY, b"{{garbage").expect("seed");

        let store = CartStore::open(backend).expect("open");

        assert!(store.is_hydrated());
        assert!(store.products().is_empty());
    }

    #[test]
    fn read_failure_propagates_and_leaves_store_unhydrated() {
        let backend = FlakyStore {
            fail_reads: true,
            ..FlakyStore::default()
        };
        let mut store = CartStore::new(backend);

        assert!(matches!(store.hydrate(), Err(CartError::IoError(_))));
        assert!(!store.is_hydrated());
        assert!(matches!(
            store.add_to_cart(apple()),
            Err(CartError::IoError(_))
        ));
        assert!(store.products().is_empty());
    }

    #[test]
    fn mutation_before_hydrate_keeps_stored_items() {
        let mut seeded = CartStore::open(MemoryStore::new()).expect("open");
        seeded.add_to_cart(apple()).expect("add");
        let backend = seeded.backend().clone();

        let mut store = CartStore::new(backend);
        store
            .add_to_cart(NewLineItem::new("2", "Pear", "v", 1.0))
            .expect("add");

        let ids: Vec<_> = store.products().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut store = CartStore::open(MemoryStore::new()).expect("open");

        store.add_to_cart(apple()).expect("add");
        assert_eq!(&stored_cart(&store), store.cart());

        store.increment("1").expect("increment");
        assert_eq!(&stored_cart(&store), store.cart());

        store.decrement("1").expect("decrement");
        store.decrement("1").expect("decrement");
        assert!(stored_cart(&store).is_empty());
    }

    #[test]
    fn noop_still_writes_snapshot() {
        let mut store = CartStore::open(FlakyStore::default()).expect("open");

        let change = store.increment("missing").expect("increment");

        assert_eq!(
            change,
            CartChange::Unchanged {
                id: ProductId::new("missing")
            }
        );
        assert_eq!(store.backend().writes, 1);
        assert!(stored_cart(&store).is_empty());
    }

    #[test]
    fn write_failure_keeps_change_and_reports_it() {
        let mut store = CartStore::open(FlakyStore::default()).expect("open");
        store.add_to_cart(apple()).expect("add");

        store.backend.fail_writes = true;
        let err = store.increment("1").expect_err("write fails");

        match err {
            CartError::PersistFailed { change, reason } => {
                assert_eq!(
                    change,
                    CartChange::Incremented {
                        id: ProductId::new("1"),
                        quantity: Quantity::new(2)
                    }
                );
                assert!(reason.contains("disk full"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // In-memory state is authoritative; storage is stale.
        assert_eq!(store.cart().get("1").map(|i| i.quantity.value()), Some(2));
        assert_eq!(stored_cart(&store).get("1").map(|i| i.quantity.value()), Some(1));

        store.backend.fail_writes = false;
        store.flush().expect("flush");
        assert_eq!(&stored_cart(&store), store.cart());
    }

    #[test]
    fn non_finite_price_is_refused_without_touching_the_cart() {
        let mut store = CartStore::open(FlakyStore::default()).expect("open");
        store.add_to_cart(apple()).expect("add");

        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store
                .add_to_cart(NewLineItem::new("2", "Ghost", "g", price))
                .expect_err("non-finite price");
            assert!(matches!(err, CartError::InvalidItem(_)));
        }
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.backend().writes, 1);

        store.increment("1").expect("later writes still succeed");
        assert_eq!(&stored_cart(&store), store.cart());
    }

    #[test]
    fn unparseable_backend_data_hydrates_empty() {
        #[derive(Debug, Default)]
        struct GarbledStore {
            inner: MemoryStore,
        }

        impl KeyValueStore for GarbledStore {
            fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
                if self.inner.is_empty() {
                    return Err(CartError::DeserializationError("garbled".to_string()));
                }
                self.inner.get(key)
            }

            fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
                self.inner.set(key, value)
            }
        }

        let mut store = CartStore::open(GarbledStore::default()).expect("open");
        assert!(store.is_hydrated());
        assert!(store.products().is_empty());

        store.add_to_cart(apple()).expect("add");
        assert_eq!(&stored_cart(&store), store.cart());
    }

    #[test]
    fn hydrate_twice_does_not_reload() {
        let mut store = CartStore::open(MemoryStore::new()).expect("open");
        store.add_to_cart(apple()).expect("add");

        store.hydrate().expect("second hydrate");
        assert_eq!(store.products().len(), 1);
    }
}
