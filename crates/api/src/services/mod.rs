//! Business logic services.
//!
//! # Services
//!
//! - `ingestion` - Barcode lookup + normalization + persistence of new products
//! - `catalog` - Read, update and delete of already-ingested products

pub mod catalog;
pub mod ingestion;

pub use catalog::{CatalogError, CatalogService};
pub use ingestion::{IngestError, IngestMode, IngestRequest, IngestionService};
