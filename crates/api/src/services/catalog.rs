//! Operations over already-ingested products.
//!
//! These never touch the lookup service. Updates are permissive: any subset
//! of fields may be replaced and no value is validated here. A `quantity` or
//! `price` the store cannot hold comes back as a store failure.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use barcode_catalog_core::{Product, ProductId, ProductUpdate};

use crate::db::{ProductStore, RepositoryError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product has this id.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// CRUD over the product store for existing records.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Every stored product, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list().await?)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store
            .find(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Replace the supplied fields and return the updated product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id; the store
    /// is left unchanged.
    #[instrument(skip(self, update))]
    pub async fn update_by_id(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let product = self
            .store
            .update(id, update)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        info!("Product updated");
        Ok(product)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: ProductId) -> Result<(), CatalogError> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound(id));
        }

        info!("Product deleted");
        Ok(())
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}
