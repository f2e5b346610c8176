//! # Formats
//!
//! Byte-level encodings of the cart. File and database I/O live in
//! `storage`.

pub mod persistence;

pub use persistence::{cart_from_bytes, cart_to_bytes};
