//! Unified error handling for the HTTP surface.
//!
//! Component errors ([`IngestError`], [`CatalogError`]) fold into [`AppError`],
//! which captures server-side failures to Sentry and renders a JSON
//! `{"message": ...}` body with a status that keeps each outcome distinguishable.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::lookup::LookupError;
use crate::services::{CatalogError, IngestError};

/// Application-level error type for the catalog API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required input missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Barcode unknown upstream, or id unknown in the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A product with this barcode already exists.
    #[error("Duplicate barcode: {0}")]
    DuplicateBarcode(String),

    /// The barcode lookup call could not be completed.
    #[error("Lookup error: {0}")]
    Upstream(#[from] LookupError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(msg) => Self::Validation(msg),
            IngestError::NotFound(barcode) => Self::NotFound(barcode),
            IngestError::DuplicateBarcode(barcode) => Self::DuplicateBarcode(barcode),
            IngestError::Upstream(e) => Self::Upstream(e),
            IngestError::Store(e) => Self::Database(e),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(format!("product {id}")),
            CatalogError::Store(e) => Self::Database(e),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateBarcode(_) => StatusCode::CONFLICT,
            Self::Upstream(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(_) => "Product not found".to_string(),
            Self::DuplicateBarcode(barcode) => {
                format!("A product with barcode {barcode} already exists")
            }
            Self::Upstream(_) => "Error fetching product details".to_string(),
            Self::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Upstream(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog request error"
            );
        } else {
            tracing::debug!(error = %self, "Catalog request rejected");
        }

        let body = ErrorBody {
            message: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use barcode_catalog_core::InvalidNumber;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 7".to_string());
        assert_eq!(err.to_string(), "Not found: product 7");

        let err = AppError::Validation("barcode is required".to_string());
        assert_eq!(err.to_string(), "Validation error: barcode is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::DuplicateBarcode("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Upstream(LookupError::Unauthorized)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("dup".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ingest_errors_stay_distinguishable() {
        let dup: AppError = IngestError::DuplicateBarcode("123".to_string()).into();
        assert!(matches!(dup, AppError::DuplicateBarcode(_)));

        let missing: AppError = IngestError::NotFound("123".to_string()).into();
        assert!(matches!(missing, AppError::NotFound(_)));

        let invalid: AppError = IngestError::Validation("price is required".to_string()).into();
        assert!(matches!(invalid, AppError::Validation(_)));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::InvalidValue(InvalidNumber {
            field: "price",
            value: "cheap".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
