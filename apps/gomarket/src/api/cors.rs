//! Cross-origin policy for browser storefronts calling the cart API.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Dev-server origins allowed when nothing else is configured.
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Every origin (`GOMARKET_CORS_ORIGINS=*`).
    Any,
    /// An explicit allow list.
    Origins(Vec<HeaderValue>),
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::Origins(parse_origins(LOCAL_ORIGINS))
    }
}

impl CorsPolicy {
    /// Policy from `GOMARKET_CORS_ORIGINS`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("GOMARKET_CORS_ORIGINS").ok().as_deref())
    }

    /// `"*"` allows everything, a comma list allows those origins, and an
    /// unset or fully invalid value falls back to the local dev origins.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::default(),
            Some("*") => Self::Any,
            Some(list) => {
                let origins = parse_origins(list.split(','));
                if origins.is_empty() {
                    tracing::warn!(
                        value = list,
                        "No usable origin in GOMARKET_CORS_ORIGINS, allowing local origins only"
                    );
                    Self::default()
                } else {
                    Self::Origins(origins)
                }
            }
        }
    }

    /// The tower-http layer enforcing this policy.
    pub fn layer(&self) -> CorsLayer {
        match self {
            Self::Any => {
                tracing::warn!("CORS open to every origin; do not expose this server publicly");
                CorsLayer::permissive()
            }
            Self::Origins(origins) => CorsLayer::new()
                .allow_origin(origins.clone())
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        }
    }
}

fn parse_origins<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Vec<HeaderValue> {
    candidates
        .into_iter()
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
