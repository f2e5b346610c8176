//! # Cart Scenario Tests
//!
//! End-to-end walks through the public API, grouped by concern:
//! - S0: Worked example (add, add, increment, decrement to empty)
//! - S1: Persistence across backends and reopen
//! - S2: Failure paths (unreadable data, failed writes, missing provider)

use gomarket_core::primitives::CART_STORAGE_KEY;
use gomarket_core::{
    CartChange, CartError, CartProvider, CartStore, FileStore, KeyValueStore, MemoryStore,
    NewLineItem, ProductId, Quantity, RedbStore, StorageBackend, use_cart,
};
use tempfile::tempdir;

fn apple() -> NewLineItem {
    NewLineItem::new("1", "Apple", "u", 2.5)
}

fn quantity_of<S: KeyValueStore>(store: &CartStore<S>, id: &str) -> Option<u32> {
    store.cart().get(id).map(|item| item.quantity.value())
}

// =============================================================================
// S0: WORKED EXAMPLE
// =============================================================================

mod s0_worked_example {
    use super::*;

    /// S0.1: The full add/increment/decrement walk ends with an empty cart.
    #[test]
    fn add_increment_decrement_to_empty() {
        let mut store = CartStore::open(MemoryStore::new()).expect("open");

        assert_eq!(
            store.add_to_cart(apple()).expect("add"),
            CartChange::Added { id: "1".into() }
        );
        let item = store.products().first().expect("one item").clone();
        assert_eq!(item.title, "Apple");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.price, 2.5);
        assert_eq!(item.quantity, Quantity::ONE);

        store.add_to_cart(apple()).expect("add again");
        assert_eq!(quantity_of(&store, "1"), Some(2));

        store.increment("1").expect("increment");
        assert_eq!(quantity_of(&store, "1"), Some(3));

        store.decrement("1").expect("decrement");
        assert_eq!(quantity_of(&store, "1"), Some(2));

        store.decrement("1").expect("decrement");
        assert_eq!(
            store.decrement("1").expect("decrement"),
            CartChange::Removed { id: "1".into() }
        );
        assert!(store.products().is_empty());
    }

    /// S0.2: Operations on unknown ids are no-ops, not errors.
    #[test]
    fn unknown_ids_leave_cart_unchanged() {
        let mut store = CartStore::open(MemoryStore::new()).expect("open");
        store.add_to_cart(apple()).expect("add");
        let before = store.snapshot();

        assert!(store.increment("404").expect("increment").is_noop());
        assert!(store.decrement("404").expect("decrement").is_noop());

        assert_eq!(store.cart(), &before);
    }
}

// =============================================================================
// S1: PERSISTENCE
// =============================================================================

mod s1_persistence {
    use super::*;

    /// S1.1: A redb-backed cart survives closing and reopening the database.
    #[test]
    fn redb_cart_survives_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cart.redb");

        {
            let mut store = CartStore::open(RedbStore::open(&path).expect("db")).expect("open");
            store.add_to_cart(apple()).expect("add");
            store
                .add_to_cart(NewLineItem::new("2", "Pear", "v", 1.25))
                .expect("add");
            store.increment("2").expect("increment");
        }

        let store = CartStore::open(RedbStore::open(&path).expect("db")).expect("reopen");
        let ids: Vec<_> = store.products().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(quantity_of(&store, "2"), Some(2));
    }

    /// S1.2: The file backend stores the documented JSON under the fixed key.
    #[test]
    fn file_backend_stores_json_under_fixed_key() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cart.json");

        let mut store = CartStore::open(FileStore::new(&path)).expect("open");
        store.add_to_cart(apple()).expect("add");

        let raw = std::fs::read_to_string(&path).expect("read file");
        let file: serde_json::Value = serde_json::from_str(&raw).expect("json object");
        let value = file[CART_STORAGE_KEY].as_str().expect("string value");
        assert_eq!(
            value,
            r#"[{"id":"1","title":"Apple","image_url":"u","price":2.5,"quantity":1}]"#
        );
    }

    /// S1.3: A provider mounted over a backend selected by name works end to end.
    #[test]
    fn provider_over_named_backend() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cart.redb");

        {
            let backend = StorageBackend::open("redb", &path).expect("backend");
            let provider = CartProvider::mount(backend).expect("mount");
            let cart = use_cart(&provider.context()).expect("cart");
            cart.add_to_cart(apple()).expect("add");
        }

        let backend = StorageBackend::open("redb", &path).expect("backend");
        let provider = CartProvider::mount(backend).expect("mount");
        let products = use_cart(&provider.context())
            .expect("cart")
            .products()
            .expect("read");
        assert_eq!(products.len(), 1);
    }
}

// =============================================================================
// S2: FAILURE PATHS
// =============================================================================

mod s2_failures {
    use super::*;

    /// Backend that accepts reads but refuses every write.
    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &[u8]) -> Result<(), CartError> {
            Err(CartError::IoError("read-only backend".to_string()))
        }
    }

    /// S2.1: A snapshot with duplicate ids hydrates as an empty cart.
    #[test]
    fn duplicate_ids_in_snapshot_hydrate_empty() {
        let mut backend = MemoryStore::new();
        let item = r#"{"id":"1","title":"A","image_url":"u","price":1.0,"quantity":1}"#;
        backend
            .set(CART_STORAGE_KEY, format!("[{item},{item}]").as_bytes())
            .expect("seed");

        let store = CartStore::open(backend).expect("open");
        assert!(store.products().is_empty());
    }

    /// S2.2: A store file that cannot be parsed loads as an empty cart and
    /// is replaced by the next write.
    #[test]
    fn corrupted_store_file_recovers_on_next_write() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cart.json");
        std::fs::write(&path, format!(r#"{{"{}": [{{"id":"1"}}]}}"#, CART_STORAGE_KEY))
            .expect("seed");

        let mut store = CartStore::open(FileStore::new(&path)).expect("open");
        assert!(store.products().is_empty());

        store.add_to_cart(apple()).expect("add");

        let reopened = CartStore::open(FileStore::new(&path)).expect("reopen");
        assert_eq!(reopened.cart(), store.cart());
        assert_eq!(quantity_of(&reopened, "1"), Some(1));
    }

    /// S2.3: A mutation on a never-hydrated store over a corrupted file
    /// still succeeds.
    #[test]
    fn corrupted_store_file_mutation_before_hydrate() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cart.json");
        std::fs::write(&path, b"not json at all").expect("seed");

        let mut store = CartStore::new(FileStore::new(&path));
        store.add_to_cart(apple()).expect("add");

        assert_eq!(quantity_of(&store, "1"), Some(1));
    }

    /// S2.4: A failed write surfaces to the caller; memory keeps the change.
    #[test]
    fn failed_write_is_reported_not_rolled_back() {
        let mut store = CartStore::open(ReadOnlyStore::default()).expect("open");

        let err = store.add_to_cart(apple()).expect_err("write refused");

        assert!(matches!(
            err,
            CartError::PersistFailed {
                change: CartChange::Added { .. },
                ..
            }
        ));
        assert_eq!(quantity_of(&store, "1"), Some(1));
        assert_eq!(
            store.backend().get(CART_STORAGE_KEY).expect("get"),
            None,
            "nothing reached the backend"
        );
    }

    /// S2.5: Cart access without a mounted provider is a scope error.
    #[test]
    fn use_cart_outside_provider() {
        let context = {
            let provider = CartProvider::mount(MemoryStore::new()).expect("mount");
            provider.context()
        };

        let err = use_cart(&context).expect_err("provider dropped");
        assert!(err.to_string().contains("within a CartProvider"));
    }

    /// S2.6: Saturated quantities stay at the maximum instead of wrapping.
    #[test]
    fn quantity_saturates() {
        let mut backend = MemoryStore::new();
        let snapshot = format!(
            r#"[{{"id":"1","title":"A","image_url":"u","price":1.0,"quantity":{}}}]"#,
            u32::MAX
        );
        backend
            .set(CART_STORAGE_KEY, snapshot.as_bytes())
            .expect("seed");
        let mut store = CartStore::open(backend).expect("open");

        let change = store.increment("1").expect("increment");

        assert_eq!(
            change,
            CartChange::Incremented {
                id: ProductId::new("1"),
                quantity: Quantity::new(u32::MAX)
            }
        );
    }
}
