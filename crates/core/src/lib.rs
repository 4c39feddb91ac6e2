//! Barcode Catalog Core - Shared types library.
//!
//! This crate provides the product types used across all barcode catalog components:
//! - `api` - HTTP service that ingests barcodes and serves the catalog
//! - `cli` - Command-line tools for migrations and lookup probing
//!
//! # Architecture
//!
//! The core crate contains only types and pure normalization functions - no I/O,
//! no database access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, the product entity and image normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
