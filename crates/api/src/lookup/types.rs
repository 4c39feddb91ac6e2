//! Barcode lookup wire types and their mapping to the catalog vocabulary.

use serde::Deserialize;

use barcode_catalog_core::{ImageSource, Images};

/// Top-level `/products` response.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<UpstreamProduct>,
}

/// One upstream product, using the upstream field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamProduct {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    /// Legacy image field; a string or a list.
    #[serde(default)]
    pub image_url: Option<Images>,
    /// Current image field; a list (occasionally a string).
    #[serde(default)]
    pub images: Option<Images>,
}

/// Product attributes from a lookup, in catalog vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct LookupProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    pub images: Images,
}

/// Treat blank strings the same as a missing field.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<UpstreamProduct> for LookupProduct {
    fn from(upstream: UpstreamProduct) -> Self {
        // `image_url` wins when it carries anything; `images` is the fallback
        let images = match (upstream.image_url, upstream.images) {
            (Some(images), _) if !images.is_empty() => images,
            (_, Some(images)) => images,
            _ => Images::normalize(ImageSource::Absent),
        };

        Self {
            title: present(upstream.product_name).or_else(|| present(upstream.title)),
            description: present(upstream.description),
            category: present(upstream.category),
            manufacturer: present(upstream.manufacturer),
            brand: present(upstream.brand),
            ingredients: present(upstream.ingredients),
            images,
        }
    }
}
