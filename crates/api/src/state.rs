//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::ProductStore;
use crate::lookup::ProductLookup;
use crate::services::{CatalogService, IngestionService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store handle is acquired once at startup
/// and handed in here; handlers never reach for global state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ProductStore>,
    ingestion: IngestionService,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Barcode lookup capability
    /// * `store` - Product persistence
    #[must_use]
    pub fn new(lookup: Arc<dyn ProductLookup>, store: Arc<dyn ProductStore>) -> Self {
        let ingestion = IngestionService::new(lookup, Arc::clone(&store));
        let catalog = CatalogService::new(Arc::clone(&store));

        Self {
            inner: Arc::new(AppStateInner {
                store,
                ingestion,
                catalog,
            }),
        }
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn store(&self) -> &dyn ProductStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the ingestion service.
    #[must_use]
    pub fn ingestion(&self) -> &IngestionService {
        &self.inner.ingestion
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
