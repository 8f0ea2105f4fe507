//! # Category Repository
//!
//! Database operations for product categories.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::{Category, CategoryPatch, CategoryWithProducts, NewCategory, Product};

/// Columns selected for a full category row.
const CATEGORY_COLUMNS: &str =
    "id, name, description, is_active, media_url, created_at, updated_at, deleted_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted category with generated id/timestamps
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, new: &NewCategory) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            is_active: new.active,
            media_url: new.media_url.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, is_active, media_url,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(&category.media_url)
        .bind(category.created_at)
        .bind(category.updated_at)
        .bind(category.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a live category by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found and not soft-deleted
    /// * `Ok(None)` - Category missing or deleted
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category together with its live products.
    pub async fn get_with_products(&self, id: &str) -> DbResult<Option<CategoryWithProducts>> {
        let Some(category) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, is_active,
                   media_url, category_id, created_at, updated_at, deleted_at
            FROM products
            WHERE category_id = ?1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(CategoryWithProducts { category, products }))
    }

    /// Lists active, live categories sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE is_active = 1 AND deleted_at IS NULL ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Lists soft-deleted categories (the explicit deleted set).
    pub async fn list_deleted(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Applies a partial update to a live category.
    ///
    /// Read-modify-write: loads the row, overlays the provided fields,
    /// writes the full row back with a fresh `updated_at`.
    pub async fn update(&self, id: &str, patch: &CategoryPatch) -> DbResult<Category> {
        let Some(mut category) = self.get_by_id(id).await? else {
            return Err(DbError::not_found("Category", id));
        };

        if let Some(name) = &patch.name {
            category.name = name.clone();
        }
        if let Some(description) = &patch.description {
            category.description = Some(description.clone());
        }
        if let Some(active) = patch.active {
            category.is_active = active;
        }
        if let Some(media_url) = &patch.media_url {
            category.media_url = Some(media_url.clone());
        }
        category.updated_at = Utc::now();

        debug!(id = %id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                is_active = ?4,
                media_url = ?5,
                updated_at = ?6
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_active)
        .bind(&category.media_url)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(category)
    }

    /// Deactivates a category (business toggle, not a deletion).
    pub async fn deactivate(&self, id: &str) -> DbResult<Category> {
        debug!(id = %id, "Deactivating category");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE categories SET is_active = 0, updated_at = ?2 \
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        // Re-read so the caller gets the stored row
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category by stamping `deleted_at`.
    ///
    /// ## Why Soft Delete?
    /// - Products still reference the category
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE categories SET deleted_at = ?2, updated_at = ?2 \
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: Some("test".to_string()),
            active: true,
            media_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.insert(&new_category("Beverages")).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Beverages");
        assert!(fetched.is_active);
        assert!(fetched.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.categories();

        repo.insert(&new_category("Beverages")).await.unwrap();
        let err = repo.insert(&new_category("Beverages")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.insert(&new_category("Beverages")).await.unwrap();
        repo.soft_delete(&created.id).await.unwrap();

        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());

        let deleted = repo.list_deleted().await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(deleted[0].deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.insert(&new_category("Beverages")).await.unwrap();

        let patch = CategoryPatch {
            description: Some("drinks and sodas".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();

        // Untouched fields keep their values
        assert_eq!(updated.name, "Beverages");
        assert_eq!(updated.description.as_deref(), Some("drinks and sodas"));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_active_list() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.insert(&new_category("Beverages")).await.unwrap();
        let deactivated = repo.deactivate(&created.id).await.unwrap();

        assert!(!deactivated.is_active);
        // Deactivated categories are hidden from the active list but still
        // directly addressable (unlike soft-deleted ones).
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.get_by_id(&created.id).await.unwrap().is_some());
    }
}
