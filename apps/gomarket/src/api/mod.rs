//! # GoMarket HTTP API Module
//!
//! The cart over HTTP, served with axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /cart` - Current cart with totals
//! - `POST /cart/products` - Add one unit of a product
//! - `POST /cart/products/{id}/increment` - One more unit
//! - `POST /cart/products/{id}/decrement` - One less unit, removed at zero
//!
//! ## Configuration (Environment Variables)
//!
//! - `GOMARKET_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `GOMARKET_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod cors;
mod handlers;
mod middleware;
mod types;

pub use cors::CorsPolicy;
pub use handlers::{
    add_product_handler, cart_handler, decrement_handler, health_handler, increment_handler,
};
pub use middleware::{DEFAULT_RATE_LIMIT, create_rate_limiter, get_rate_limit_from_env};
pub use types::{AddProductRequest, CartResponse, HealthResponse};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use gomarket_core::{CartContext, CartError, CartProvider};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the context handlers resolve with `use_cart`.
///
/// The state never owns the cart. Whoever mounted the `CartProvider` keeps
/// it alive for as long as the server should answer.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub cart: CartContext,
}

impl AppState {
    #[must_use]
    pub fn new(cart: CartContext) -> Self {
        Self { cart }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Knobs of the HTTP layer that come from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Requests per second across all routes; 0 turns limiting off.
    pub rate_limit: u32,
    pub cors: CorsPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            cors: CorsPolicy::default(),
        }
    }
}

impl RouterConfig {
    /// `GOMARKET_RATE_LIMIT` and `GOMARKET_CORS_ORIGINS`.
    pub fn from_env() -> Self {
        Self {
            rate_limit: get_rate_limit_from_env(),
            cors: CorsPolicy::from_env(),
        }
    }
}

/// Router configured from the environment.
pub fn create_router(state: AppState) -> Router {
    create_router_with(state, &RouterConfig::from_env())
}

/// Router with all cart routes.
///
/// Layers, outermost first: request tracing, CORS, body size limit, then
/// the rate limiter when enabled.
pub fn create_router_with(state: AppState, config: &RouterConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/cart", get(cart_handler))
        .route("/cart/products", post(add_product_handler))
        .route("/cart/products/{id}/increment", post(increment_handler))
        .route("/cart/products/{id}/decrement", post(decrement_handler));

    if config.rate_limit > 0 {
        tracing::info!(requests_per_second = config.rate_limit, "Rate limiting enabled");
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(config.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(config.cors.layer())
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the cart of `provider` on `addr` until Ctrl+C.
///
/// The provider stays mounted for the lifetime of the server and is dropped
/// after shutdown.
pub async fn run_server(addr: &str, provider: CartProvider) -> Result<(), CartError> {
    let router = create_router(AppState::new(provider.context()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CartError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("GoMarket HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CartError::IoError(format!("Server error: {}", e)))?;

    tracing::info!("GoMarket HTTP server stopped");
    drop(provider);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
