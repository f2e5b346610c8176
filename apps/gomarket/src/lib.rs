//! # GoMarket
//!
//! Consumers of the GoMarket cart: a clap CLI and an axum HTTP API, both
//! talking to `gomarket-core` through `use_cart`.

pub mod api;
pub mod cli;
pub mod totals;
