//! # API Endpoint Handlers
//!
//! Every cart handler resolves the shared context with `use_cart` first; a
//! server whose provider is gone answers 500 instead of serving a stale cart.
//!
//! Mutations write to disk while holding the cart lock, so they run on the
//! blocking pool rather than on a runtime worker.

use super::{
    AppState,
    types::{AddProductRequest, CartResponse, HealthResponse},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use gomarket_core::{CartChange, CartError, CartHandle, use_cart};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CART HANDLER
// =============================================================================

/// Current cart with totals.
pub async fn cart_handler(State(state): State<AppState>) -> impl IntoResponse {
    match use_cart(&state.cart).and_then(|cart| cart.products()) {
        Ok(products) => (StatusCode::OK, Json(CartResponse::snapshot(products))),
        Err(e) => (status_for(&e), Json(CartResponse::error(e.to_string()))),
    }
}

// =============================================================================
// MUTATION HANDLERS
// =============================================================================

/// Add one unit of a product.
pub async fn add_product_handler(
    State(state): State<AppState>,
    Json(request): Json<AddProductRequest>,
) -> impl IntoResponse {
    let product = match request.to_new_item() {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CartResponse::error(format!("Invalid product: {}", e))),
            );
        }
    };

    mutate(state, move |cart| cart.add_to_cart(product)).await
}

/// Add one unit to an existing line item.
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    mutate(state, move |cart| cart.increment(&id)).await
}

/// Take one unit from an existing line item, removing it at zero.
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    mutate(state, move |cart| cart.decrement(&id)).await
}

/// Run `mutation` on the blocking pool.
async fn mutate(
    state: AppState,
    mutation: impl FnOnce(&CartHandle) -> Result<CartChange, CartError> + Send + 'static,
) -> (StatusCode, Json<CartResponse>) {
    match tokio::task::spawn_blocking(move || apply(&state, mutation)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Cart mutation task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CartResponse::error(format!("Cart mutation failed: {}", e))),
            )
        }
    }
}

/// Run one cart mutation and report the cart it left behind.
fn apply(
    state: &AppState,
    mutation: impl FnOnce(&CartHandle) -> Result<CartChange, CartError>,
) -> (StatusCode, Json<CartResponse>) {
    let cart = match use_cart(&state.cart) {
        Ok(cart) => cart,
        Err(e) => return (status_for(&e), Json(CartResponse::error(e.to_string()))),
    };

    match mutation(&cart) {
        Ok(change) => match cart.products() {
            Ok(products) => (StatusCode::OK, Json(CartResponse::changed(change, products))),
            Err(e) => (status_for(&e), Json(CartResponse::error(e.to_string()))),
        },
        Err(CartError::PersistFailed { change, reason }) => {
            let products = cart.products().unwrap_or_default();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CartResponse::error_with_products(
                    format!("Cart updated but not saved: {}", reason),
                    change,
                    products,
                )),
            )
        }
        Err(e) => (status_for(&e), Json(CartResponse::error(e.to_string()))),
    }
}

fn status_for(error: &CartError) -> StatusCode {
    match error {
        CartError::InvalidItem(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
