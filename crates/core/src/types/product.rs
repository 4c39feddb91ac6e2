//! The product entity and its write models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::images::Images;
use super::number::{InvalidNumber, NumericInput, number_option};

/// A persisted catalog product.
///
/// Descriptive attributes come from the barcode lookup (or a later update)
/// and are omitted from JSON when unknown. `quantity` and `price` are only
/// ever supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// Natural key, unique across the catalog.
    pub barcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    /// Image URLs, always a list.
    #[serde(default)]
    pub images: Vec<String>,
    /// Units on hand.
    #[serde(
        default,
        with = "number_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<Decimal>,
    /// Unit price.
    #[serde(
        default,
        with = "number_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product about to be inserted. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProduct {
    pub barcode: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub ingredients: Option<String>,
    pub images: Images,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// Partial update of an existing product.
///
/// Each field is `None` when absent from the payload. A field that is present
/// replaces the stored value, and an explicit `null` clears it. The barcode is
/// not updatable. `images` accepts a single URL or a list; `null` empties it.
///
/// `quantity` and `price` are not checked here: non-numeric input is kept as
/// [`NumericInput::Other`] and refused by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub manufacturer: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub ingredients: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub images: Option<Images>,
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<Option<NumericInput>>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<NumericInput>>,
}

/// Mark a field that appears in the payload as supplied, even when `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn resolve(
    value: Option<&Option<NumericInput>>,
    field: &'static str,
) -> Result<Option<Option<Decimal>>, InvalidNumber> {
    value
        .map(|input| input.as_ref().map(|n| n.to_decimal(field)).transpose())
        .transpose()
}

impl ProductUpdate {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.manufacturer.is_none()
            && self.brand.is_none()
            && self.ingredients.is_none()
            && self.images.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
    }

    /// Supplied quantity as a decimal; `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` if the supplied value is not numeric.
    pub fn quantity(&self) -> Result<Option<Option<Decimal>>, InvalidNumber> {
        resolve(self.quantity.as_ref(), "quantity")
    }

    /// Supplied price as a decimal; `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` if the supplied value is not numeric.
    pub fn price(&self) -> Result<Option<Option<Decimal>>, InvalidNumber> {
        resolve(self.price.as_ref(), "price")
    }

    /// Apply the supplied fields to `product` in place.
    ///
    /// Numeric fields are resolved first, so `product` is untouched on error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` if `quantity` or `price` is not numeric.
    pub fn apply_to(&self, product: &mut Product) -> Result<(), InvalidNumber> {
        fn set<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        let quantity = self.quantity()?;
        let price = self.price()?;

        set(&mut product.title, self.title.as_ref());
        set(&mut product.description, self.description.as_ref());
        set(&mut product.category, self.category.as_ref());
        set(&mut product.manufacturer, self.manufacturer.as_ref());
        set(&mut product.brand, self.brand.as_ref());
        set(&mut product.ingredients, self.ingredients.as_ref());
        set(&mut product.quantity, quantity.as_ref());
        set(&mut product.price, price.as_ref());
        if let Some(images) = &self.images {
            product.images = images.as_slice().to_vec();
        }
        Ok(())
    }
}
