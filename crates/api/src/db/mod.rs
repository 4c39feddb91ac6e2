//! Product persistence.
//!
//! # Database: `catalog`
//!
//! ## Tables
//!
//! - `catalog.product` - Ingested products, `UNIQUE (barcode)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p barcode-catalog-cli -- migrate
//! ```
//!
//! The [`ProductStore`] trait is the seam the services depend on.
//! [`PgProductStore`] backs production; [`MemoryProductStore`] backs tests.

pub mod memory;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use barcode_catalog_core::{InvalidNumber, NewProduct, Product, ProductId, ProductUpdate};

pub use memory::MemoryProductStore;
pub use products::PgProductStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A supplied value cannot be stored in its column.
    #[error("invalid value: {0}")]
    InvalidValue(#[from] InvalidNumber),

    /// Constraint violation (e.g., unique barcode).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence capability for products, keyed by a unique barcode.
///
/// Implementations enforce barcode uniqueness themselves: a second insert
/// with the same barcode returns [`RepositoryError::Conflict`], including when
/// two inserts race.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product and return it with its assigned id.
    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// All products in insertion order.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Find a product by id.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Apply a partial update; `None` if no product has this id.
    async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product; `false` if no product has this id.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
