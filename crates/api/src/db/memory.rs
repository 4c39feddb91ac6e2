//! In-memory product store.
//!
//! Mirrors the `PostgreSQL` store's semantics (sequential ids, unique barcode,
//! insertion-ordered listing) without a database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use barcode_catalog_core::{NewProduct, Product, ProductId, ProductUpdate};

use super::{ProductStore, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    products: BTreeMap<ProductId, Product>,
    by_barcode: HashMap<String, ProductId>,
}

/// Product store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: RwLock<Inner>,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub async fn len(&self) -> usize {
        self.inner.read().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        // Uniqueness check and insert happen under one write lock
        let mut inner = self.inner.write().await;

        if inner.by_barcode.contains_key(&product.barcode) {
            return Err(RepositoryError::Conflict(format!(
                "barcode {} already exists",
                product.barcode
            )));
        }

        inner.next_id += 1;
        let id = ProductId::new(inner.next_id);
        let now = Utc::now();

        let stored = Product {
            id,
            barcode: product.barcode.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            manufacturer: product.manufacturer.clone(),
            brand: product.brand.clone(),
            ingredients: product.ingredients.clone(),
            images: product.images.as_slice().to_vec(),
            quantity: product.quantity,
            price: product.price,
            created_at: now,
            updated_at: now,
        };

        inner.by_barcode.insert(stored.barcode.clone(), id);
        inner.products.insert(id, stored.clone());

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;

        let Some(product) = inner.products.get_mut(&id) else {
            return Ok(None);
        };

        if !update.is_empty() {
            // Applied to a copy so a rejected value leaves the record as it was
            let mut updated = product.clone();
            update.apply_to(&mut updated)?;
            updated.updated_at = Utc::now();
            *product = updated;
        }

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;

        match inner.products.remove(&id) {
            Some(product) => {
                inner.by_barcode.remove(&product.barcode);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use barcode_catalog_core::{ImageSource, Images};

    use super::*;

    fn new_product(barcode: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            title: Some(format!("Product {barcode}")),
            images: Images::normalize(ImageSource::One("http://x/1.jpg".to_string())),
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryProductStore::new();

        let first = store.insert(&new_product("111")).await.unwrap();
        let second = store.insert(&new_product("222")).await.unwrap();

        assert_eq!(first.id, ProductId::new(1));
        assert_eq!(second.id, ProductId::new(2));
        assert_eq!(first.images, vec!["http://x/1.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_is_conflict() {
        let store = MemoryProductStore::new();
        store.insert(&new_product("111")).await.unwrap();

        let err = store.insert(&new_product("111")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_admit_one() {
        let store = Arc::new(MemoryProductStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(&new_product("333")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_insertion_ordered() {
        let store = MemoryProductStore::new();
        for barcode in ["c", "a", "b"] {
            store.insert(&new_product(barcode)).await.unwrap();
        }

        let barcodes: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.barcode)
            .collect();

        assert_eq!(barcodes, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_update_missing_id_returns_none() {
        let store = MemoryProductStore::new();
        let update = ProductUpdate {
            title: Some(Some("Nope".to_string())),
            ..ProductUpdate::default()
        };

        assert!(store.update(ProductId::new(9), &update).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_rejects_non_numeric_value() {
        let store = MemoryProductStore::new();
        let product = store.insert(&new_product("555")).await.unwrap();
        let update: ProductUpdate =
            serde_json::from_str(r#"{"title": "Renamed", "price": "cheap"}"#).unwrap();

        let err = store.update(product.id, &update).await.unwrap_err();

        assert!(matches!(err, RepositoryError::InvalidValue(_)));
        let stored = store.find(product.id).await.unwrap().unwrap();
        assert_eq!(stored, product);
    }

    #[tokio::test]
    async fn test_update_null_clears_field() {
        let store = MemoryProductStore::new();
        let product = store.insert(&new_product("666")).await.unwrap();
        let update: ProductUpdate = serde_json::from_str(r#"{"title": null}"#).unwrap();

        let updated = store.update(product.id, &update).await.unwrap().unwrap();

        assert!(updated.title.is_none());
        assert_eq!(updated.images, product.images);
    }

    #[tokio::test]
    async fn test_delete_frees_barcode() {
        let store = MemoryProductStore::new();
        let product = store.insert(&new_product("444")).await.unwrap();

        assert!(store.delete(product.id).await.unwrap());
        assert!(!store.delete(product.id).await.unwrap());

        // The barcode can be ingested again once its record is gone
        let again = store.insert(&new_product("444")).await.unwrap();
        assert_ne!(again.id, product.id);
    }
}
