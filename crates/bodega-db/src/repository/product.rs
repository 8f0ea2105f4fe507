//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Filtered listing (category, active flag) joined with the category name
//! - Guarded stock subtraction
//!
//! Stock is only ever *decremented* through two paths, both guarded:
//! the sale transaction coordinator (see [`super::sale`]) and
//! [`ProductRepository::subtract_stock`]. Restocking goes through the
//! regular partial update.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::{Category, NewProduct, Product, ProductDetail, ProductListing, ProductPatch};

/// Columns selected for a full product row.
const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock, is_active, \
                               media_url, category_id, created_at, updated_at, deleted_at";

/// Optional filters for product listing, deserialized straight from the
/// request query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Only products in this category.
    pub category_id: Option<String>,
    /// Only products with this active flag.
    pub active: Option<bool>,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let listing = repo.list(&ProductFilter::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id/timestamps
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown category_id
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            stock: new.stock,
            is_active: new.active,
            media_url: new.media_url.clone(),
            category_id: new.category_id.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, stock, is_active,
                media_url, category_id, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(&product.media_url)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a live product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found and not soft-deleted
    /// * `Ok(None)` - Product missing or deleted
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product with its full category attached.
    ///
    /// The category is resolved even if it has since been deactivated, so
    /// the read model stays renderable.
    pub async fn get_with_category(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let Some(product) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, is_active, media_url, created_at, updated_at, deleted_at \
             FROM categories WHERE id = ?1",
        )
        .bind(&product.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(ProductDetail { product, category }))
    }

    /// Lists live products with their category name, optionally filtered.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<ProductListing>> {
        debug!(?filter, "Listing products");

        let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT p.id, p.name, p.description, p.price_cents, p.stock, p.is_active, \
                    p.media_url, p.category_id, p.created_at, p.updated_at, p.deleted_at, \
                    c.name AS category \
             FROM products p \
             INNER JOIN categories c ON c.id = p.category_id \
             WHERE p.deleted_at IS NULL",
        );

        if let Some(category_id) = &filter.category_id {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(active) = filter.active {
            query.push(" AND p.is_active = ").push_bind(active);
        }
        query.push(" ORDER BY p.name");

        let products = query
            .build_query_as::<ProductListing>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists soft-deleted products (the explicit deleted set).
    pub async fn list_deleted(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Applies a partial update to a live product.
    ///
    /// Read-modify-write, same discipline as the category repository.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        let Some(mut product) = self.get_by_id(id).await? else {
            return Err(DbError::not_found("Product", id));
        };

        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(description) = &patch.description {
            product.description = Some(description.clone());
        }
        if let Some(price_cents) = patch.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(active) = patch.active {
            product.is_active = active;
        }
        if let Some(category_id) = &patch.category_id {
            product.category_id = category_id.clone();
        }
        if let Some(media_url) = &patch.media_url {
            product.media_url = Some(media_url.clone());
        }
        product.updated_at = Utc::now();

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                is_active = ?6,
                media_url = ?7,
                category_id = ?8,
                updated_at = ?9
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(&product.media_url)
        .bind(&product.category_id)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Subtracts stock from a product, refusing to under-run.
    ///
    /// The decrement is guarded in the WHERE clause, so "missing product"
    /// and "not enough stock" collapse into the same no-effect outcome.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Stock was decremented; returns the fresh row
    /// * `Ok(None)` - Product missing, deleted, or stock insufficient
    pub async fn subtract_stock(&self, id: &str, quantity: i64) -> DbResult<Option<Product>> {
        debug!(id = %id, quantity = %quantity, "Subtracting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND deleted_at IS NULL AND stock >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Deactivates a product (business toggle, not a deletion).
    pub async fn deactivate(&self, id: &str) -> DbResult<Product> {
        debug!(id = %id, "Deactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 \
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by stamping `deleted_at`.
    ///
    /// ## Why Soft Delete?
    /// - Historical sale lines still reference this product
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET deleted_at = ?2, updated_at = ?2 \
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts live products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bodega_core::NewCategory;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_category(db: &Database, name: &str) -> Category {
        db.categories()
            .insert(&NewCategory {
                name: name.to_string(),
                description: None,
                active: true,
                media_url: None,
            })
            .await
            .unwrap()
    }

    fn new_product(name: &str, category_id: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price_cents,
            stock,
            active: true,
            category_id: category_id.to_string(),
            media_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let category = seed_category(&db, "Pantry").await;
        let repo = db.products();

        let created = repo
            .insert(&new_product("Olive Oil 1L", &category.id, 1250, 8))
            .await
            .unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Olive Oil 1L");
        assert_eq!(fetched.price_cents, 1250);
        assert_eq!(fetched.stock, 8);
    }

    #[tokio::test]
    async fn test_insert_unknown_category_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo
            .insert(&new_product("Orphan", "no-such-category", 100, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let pantry = seed_category(&db, "Pantry").await;
        let dairy = seed_category(&db, "Dairy").await;
        let repo = db.products();

        repo.insert(&new_product("Olive Oil 1L", &pantry.id, 1250, 8))
            .await
            .unwrap();
        repo.insert(&new_product("Rice 5kg", &pantry.id, 899, 20))
            .await
            .unwrap();
        let milk = repo
            .insert(&new_product("Milk 1L", &dairy.id, 120, 30))
            .await
            .unwrap();
        repo.deactivate(&milk.id).await.unwrap();

        let all = repo.list(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|p| p.category == "Dairy"));

        let pantry_only = repo
            .list(&ProductFilter {
                category_id: Some(pantry.id.clone()),
                active: None,
            })
            .await
            .unwrap();
        assert_eq!(pantry_only.len(), 2);

        let active_only = repo
            .list(&ProductFilter {
                category_id: None,
                active: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(active_only.len(), 2);
    }

    #[tokio::test]
    async fn test_subtract_stock_guarded() {
        let db = test_db().await;
        let category = seed_category(&db, "Pantry").await;
        let repo = db.products();

        let product = repo
            .insert(&new_product("Olive Oil 1L", &category.id, 1250, 5))
            .await
            .unwrap();

        let updated = repo.subtract_stock(&product.id, 3).await.unwrap().unwrap();
        assert_eq!(updated.stock, 2);

        // Requesting more than remains is a no-effect outcome
        assert!(repo.subtract_stock(&product.id, 3).await.unwrap().is_none());
        let unchanged = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stock, 2);

        // Same for an unknown product
        assert!(repo.subtract_stock("missing", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let db = test_db().await;
        let category = seed_category(&db, "Pantry").await;
        let repo = db.products();

        let product = repo
            .insert(&new_product("Olive Oil 1L", &category.id, 1250, 5))
            .await
            .unwrap();
        repo.soft_delete(&product.id).await.unwrap();

        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
        assert!(repo.list(&ProductFilter::default()).await.unwrap().is_empty());
        assert_eq!(repo.list_deleted().await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_with_category() {
        let db = test_db().await;
        let category = seed_category(&db, "Pantry").await;
        let repo = db.products();

        let product = repo
            .insert(&new_product("Olive Oil 1L", &category.id, 1250, 5))
            .await
            .unwrap();

        let detail = repo.get_with_category(&product.id).await.unwrap().unwrap();
        assert_eq!(detail.category.name, "Pantry");
        assert_eq!(detail.product.id, product.id);
    }
}
