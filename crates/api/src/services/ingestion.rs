//! Product ingestion: barcode lookup, normalization and persistence.
//!
//! 1. Validate the request for the chosen [`IngestMode`]
//! 2. Look the barcode up (exactly one upstream call)
//! 3. Merge lookup attributes with caller-supplied quantity/price
//! 4. Insert (exactly one attempt); a barcode collision is `DuplicateBarcode`
//!
//! Nothing is retried and nothing is persisted unless the lookup succeeds.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use barcode_catalog_core::{NewProduct, Product, number_option};

use crate::db::{ProductStore, RepositoryError};
use crate::lookup::{LookupError, LookupProduct, ProductLookup};

/// Which fields an ingestion requires besides the barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Barcode only; quantity and price are stored if supplied.
    Catalog,
    /// Barcode, quantity and price are all required.
    Stocked,
}

/// Caller input for an ingestion.
///
/// `quantity` and `price` accept JSON numbers or numeric strings; anything
/// else fails to parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, with = "number_option")]
    pub quantity: Option<Decimal>,
    #[serde(default, with = "number_option")]
    pub price: Option<Decimal>,
}

impl IngestRequest {
    /// Convenience constructor for a barcode-only request.
    #[must_use]
    pub fn barcode(barcode: impl Into<String>) -> Self {
        Self {
            barcode: Some(barcode.into()),
            ..Self::default()
        }
    }

    /// Attach quantity and price.
    #[must_use]
    pub fn with_stock(mut self, quantity: Decimal, price: Decimal) -> Self {
        self.quantity = Some(quantity);
        self.price = Some(price);
        self
    }
}

/// Errors that can occur during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required input missing.
    #[error("validation error: {0}")]
    Validation(String),

    /// The lookup service has no product for this barcode.
    #[error("barcode {0} not found")]
    NotFound(String),

    /// The lookup call failed.
    #[error("lookup unavailable: {0}")]
    Upstream(#[from] LookupError),

    /// A product with this barcode is already stored.
    #[error("barcode {0} already exists")]
    DuplicateBarcode(String),

    /// Any other store failure.
    #[error("store error: {0}")]
    Store(RepositoryError),
}

/// A request that passed validation.
#[derive(Debug)]
struct ValidRequest {
    barcode: String,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
}

fn validate(request: IngestRequest, mode: IngestMode) -> Result<ValidRequest, IngestError> {
    let barcode = request
        .barcode
        .map(|b| b.trim().to_owned())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| IngestError::Validation("barcode is required".to_string()))?;

    if mode == IngestMode::Stocked {
        if request.quantity.is_none() {
            return Err(IngestError::Validation("quantity is required".to_string()));
        }
        if request.price.is_none() {
            return Err(IngestError::Validation("price is required".to_string()));
        }
    }

    Ok(ValidRequest {
        barcode,
        quantity: request.quantity,
        price: request.price,
    })
}

/// Merge lookup attributes with caller-supplied stock fields.
fn build_candidate(request: ValidRequest, found: LookupProduct) -> NewProduct {
    NewProduct {
        barcode: request.barcode,
        title: found.title,
        description: found.description,
        category: found.category,
        manufacturer: found.manufacturer,
        brand: found.brand,
        ingredients: found.ingredients,
        images: found.images,
        quantity: request.quantity,
        price: request.price,
    }
}

/// Orchestrates lookup and persistence for new products.
#[derive(Clone)]
pub struct IngestionService {
    lookup: Arc<dyn ProductLookup>,
    store: Arc<dyn ProductStore>,
}

impl IngestionService {
    /// Create a new ingestion service.
    #[must_use]
    pub fn new(lookup: Arc<dyn ProductLookup>, store: Arc<dyn ProductStore>) -> Self {
        Self { lookup, store }
    }

    /// Ingest a product from a barcode.
    ///
    /// # Errors
    ///
    /// - `IngestError::Validation` if required input is missing (lookup is not called)
    /// - `IngestError::NotFound` if the lookup has no match
    /// - `IngestError::Upstream` if the lookup call failed
    /// - `IngestError::DuplicateBarcode` if the barcode is already stored
    /// - `IngestError::Store` for other store failures
    #[instrument(skip(self, request), fields(barcode = tracing::field::Empty))]
    pub async fn ingest(
        &self,
        request: IngestRequest,
        mode: IngestMode,
    ) -> Result<Product, IngestError> {
        let request = validate(request, mode)?;
        tracing::Span::current().record("barcode", request.barcode.as_str());

        let Some(found) = self.lookup.lookup(&request.barcode).await? else {
            info!("Barcode has no upstream match");
            return Err(IngestError::NotFound(request.barcode));
        };

        let barcode = request.barcode.clone();
        let candidate = build_candidate(request, found);

        let product = self.store.insert(&candidate).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                warn!("Barcode already ingested");
                IngestError::DuplicateBarcode(barcode)
            }
            other => IngestError::Store(other),
        })?;

        info!(product_id = %product.id, "Product ingested");
        Ok(product)
    }
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService").finish_non_exhaustive()
    }
}
