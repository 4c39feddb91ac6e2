//! Barcode Catalog API library.
//!
//! Ingests products by barcode through an external lookup service, stores
//! them in `PostgreSQL` and exposes CRUD over HTTP. Exposed as a library so
//! the router can be exercised in tests without a network listener.
//!
//! # Layers
//!
//! - [`lookup`] - Barcode lookup client
//! - [`db`] - Product store (Postgres and in-memory)
//! - [`services`] - Ingestion and catalog operations
//! - [`routes`] - axum handlers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod routes;
pub mod services;
pub mod state;
