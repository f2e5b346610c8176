//! # CLI Command Implementations
//!
//! Each command mounts a `CartProvider` over the configured backend, resolves
//! it with `use_cart`, does one thing and exits.

use crate::api;
use crate::totals::CartTotals;
use gomarket_core::{
    CartChange, CartError, CartHandle, CartProvider, LineItem, NewLineItem, StorageBackend,
    use_cart,
};
use serde_json::json;
use std::path::Path;

// =============================================================================
// PROVIDER SETUP
// =============================================================================

/// Open `backend` at `db_path` and mount a provider over it.
pub fn open_provider(db_path: &Path, backend: &str) -> Result<CartProvider, CartError> {
    let storage = StorageBackend::open(backend, db_path)?;
    if !storage.is_persistent() {
        tracing::warn!("Using the memory backend: the cart is lost when the process exits");
    }
    CartProvider::mount(storage)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    db_path: &Path,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), CartError> {
    let provider = open_provider(db_path, backend)?;

    println!("GoMarket Cart Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET  /cart                          - Current cart");
    println!("  POST /cart/products                 - Add a product");
    println!("  POST /cart/products/{{id}}/increment - One more unit");
    println!("  POST /cart/products/{{id}}/decrement - One less unit");
    println!("  GET  /health                        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, provider).await
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// Show the cart.
pub fn cmd_list(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), CartError> {
    let provider = open_provider(db_path, backend)?;
    let products = use_cart(&provider.context())?.products()?;
    print_cart(&products, json_mode);
    Ok(())
}

// =============================================================================
// MUTATION COMMANDS
// =============================================================================

/// Add one unit of `product`.
pub fn cmd_add(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    product: NewLineItem,
) -> Result<(), CartError> {
    product.validate()?;
    run_mutation(db_path, backend, json_mode, |cart| cart.add_to_cart(product))
}

/// One more unit of `id`.
pub fn cmd_increment(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    id: &str,
) -> Result<(), CartError> {
    run_mutation(db_path, backend, json_mode, |cart| cart.increment(id))
}

/// One less unit of `id`.
pub fn cmd_decrement(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    id: &str,
) -> Result<(), CartError> {
    run_mutation(db_path, backend, json_mode, |cart| cart.decrement(id))
}

fn run_mutation(
    db_path: &Path,
    backend: &str,
    json_mode: bool,
    mutation: impl FnOnce(&CartHandle) -> Result<CartChange, CartError>,
) -> Result<(), CartError> {
    let provider = open_provider(db_path, backend)?;
    let cart = use_cart(&provider.context())?;

    let change = mutation(&cart)?;
    let products = cart.products()?;

    if json_mode {
        let totals = CartTotals::from_items(&products);
        let output = json!({
            "change": change,
            "products": products,
            "total_items": totals.total_items,
            "total_price": totals.total_price,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else {
        println!("{}", describe_change(&change));
        println!();
        print_cart(&products, false);
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_cart(products: &[LineItem], json_mode: bool) {
    let totals = CartTotals::from_items(products);

    if json_mode {
        let output = json!({
            "products": products,
            "total_items": totals.total_items,
            "total_price": totals.total_price,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return;
    }

    if products.is_empty() {
        println!("Cart is empty");
        return;
    }

    println!("Cart:");
    for item in products {
        println!(
            "  [{}] {} x{} @ {:.2}",
            item.id, item.title, item.quantity, item.price
        );
    }
    println!();
    println!("  Items: {}", totals.total_items);
    println!("  Total: {:.2}", totals.total_price);
}

/// One-line human summary of a change.
pub fn describe_change(change: &CartChange) -> String {
    match change {
        CartChange::Added { id } => format!("Added {} to the cart", id),
        CartChange::Incremented { id, quantity } | CartChange::Decremented { id, quantity } => {
            format!("{} now x{}", id, quantity)
        }
        CartChange::Removed { id } => format!("Removed {} from the cart", id),
        CartChange::Unchanged { id } => format!("{} is not in the cart; nothing changed", id),
    }
}

// =============================================================================
// TESTS
// =============================================================================
