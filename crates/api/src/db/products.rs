//! `PostgreSQL` product repository.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database. Partial updates use `QueryBuilder` so that only
//! supplied columns appear in the `SET` list, and `null` clears a column.
//!
//! The tests below need a `PostgreSQL` server:
//! ```bash
//! DATABASE_URL=postgres://localhost/postgres cargo test -p barcode-catalog-api -- --ignored
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Encode, PgPool, Postgres, QueryBuilder, Type};

use barcode_catalog_core::{NewProduct, Product, ProductId, ProductUpdate};

use super::{ProductStore, RepositoryError};

const PRODUCT_COLUMNS: &str = r"
    id, barcode, title, description, category, manufacturer, brand,
    ingredients, images, quantity, price, created_at, updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    barcode: String,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    manufacturer: Option<String>,
    brand: Option<String>,
    ingredients: Option<String>,
    images: Vec<String>,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            barcode: row.barcode,
            title: row.title,
            description: row.description,
            category: row.category,
            manufacturer: row.manufacturer,
            brand: row.brand,
            ingredients: row.ingredients,
            images: row.images,
            quantity: row.quantity,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Append `, column = $n` when the field was supplied.
fn set<'args, T>(query: &mut QueryBuilder<'args, Postgres>, column: &str, value: Option<T>)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = value {
        query.push(", ").push(column).push(" = ").push_bind(value);
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Product store backed by the `catalog.product` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the barcode already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO catalog.product (
                barcode, title, description, category, manufacturer, brand,
                ingredients, images, quantity, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.barcode)
            .bind(&product.title)
            .bind(&product.description)
            .bind(&product.category)
            .bind(&product.manufacturer)
            .bind(&product.brand)
            .bind(&product.ingredients)
            .bind(product.images.as_slice())
            .bind(product.quantity)
            .bind(product.price)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(format!(
                        "barcode {} already exists",
                        product.barcode
                    ));
                }
                RepositoryError::Database(e)
            })?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product ORDER BY id");

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = $1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        if update.is_empty() {
            return self.find(id).await;
        }

        // Non-numeric values never reach SQL
        let quantity = update.quantity()?;
        let price = update.price()?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE catalog.product SET updated_at = NOW()");
        set(&mut query, "title", update.title.clone());
        set(&mut query, "description", update.description.clone());
        set(&mut query, "category", update.category.clone());
        set(&mut query, "manufacturer", update.manufacturer.clone());
        set(&mut query, "brand", update.brand.clone());
        set(&mut query, "ingredients", update.ingredients.clone());
        set(
            &mut query,
            "images",
            update.images.as_ref().map(|images| images.as_slice().to_vec()),
        );
        set(&mut query, "quantity", quantity);
        set(&mut query, "price", price);
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        let row = query
            .build_query_as::<ProductRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use barcode_catalog_core::{ImageSource, Images};

    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            barcode: "012345678905".to_string(),
            title: Some("Widget".to_string()),
            brand: Some("Acme".to_string()),
            images: Images::normalize(ImageSource::One("http://x/1.jpg".to_string())),
            quantity: Some(Decimal::from(10)),
            price: Some(Decimal::from_str("9.99").unwrap()),
            ..NewProduct::default()
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_insert_and_find(pool: PgPool) {
        let store = PgProductStore::new(pool);

        let product = store.insert(&widget()).await.unwrap();
        let found = store.find(product.id).await.unwrap().unwrap();

        assert_eq!(found, product);
        assert_eq!(found.images, vec!["http://x/1.jpg".to_string()]);
        assert_eq!(found.price, Some(Decimal::from_str("9.99").unwrap()));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_duplicate_barcode_is_conflict(pool: PgPool) {
        let store = PgProductStore::new(pool);
        store.insert(&widget()).await.unwrap();

        let err = store.insert(&widget()).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_sets_only_supplied_columns(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let product = store.insert(&widget()).await.unwrap();
        let update: ProductUpdate =
            serde_json::from_str(r#"{"quantity": 2.5, "brand": null}"#).unwrap();

        let updated = store.update(product.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.quantity, Some(Decimal::from_str("2.5").unwrap()));
        assert!(updated.brand.is_none());
        assert_eq!(updated.title, product.title);
        assert_eq!(updated.price, product.price);
        assert_eq!(updated.images, product.images);
        assert_eq!(updated.barcode, product.barcode);
        assert!(updated.updated_at >= product.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_rejects_non_numeric_price(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let product = store.insert(&widget()).await.unwrap();
        let update: ProductUpdate = serde_json::from_str(r#"{"price": "cheap"}"#).unwrap();

        let err = store.update(product.id, &update).await.unwrap_err();

        assert!(matches!(err, RepositoryError::InvalidValue(_)));
        assert_eq!(store.find(product.id).await.unwrap().unwrap(), product);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
    async fn test_update_and_delete_missing_id(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let update: ProductUpdate = serde_json::from_str(r#"{"title": "Nope"}"#).unwrap();

        assert!(store.update(ProductId::new(42), &update).await.unwrap().is_none());
        assert!(!store.delete(ProductId::new(42)).await.unwrap());
        assert!(store.ping().await.is_ok());
    }
}
