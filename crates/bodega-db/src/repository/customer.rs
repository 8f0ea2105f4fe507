//! # Customer Repository
//!
//! Database operations for customers.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::{Customer, CustomerPatch, NewCustomer};

/// Columns selected for a full customer row.
const CUSTOMER_COLUMNS: &str =
    "id, name, city, channel, media_url, created_at, updated_at, deleted_at";

/// Optional filters for customer listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    /// Only customers in this city.
    pub city: Option<String>,
    /// Only customers acquired through this channel.
    pub channel: Option<String>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, new: &NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            city: new.city.clone(),
            channel: new.channel.clone(),
            media_url: new.media_url.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, city, channel, media_url,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.city)
        .bind(&customer.channel)
        .bind(&customer.media_url)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(customer.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a live customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists live customers sorted by name, optionally filtered.
    pub async fn list(&self, filter: &CustomerFilter) -> DbResult<Vec<Customer>> {
        debug!(?filter, "Listing customers");

        let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE deleted_at IS NULL"
        ));

        if let Some(city) = &filter.city {
            query.push(" AND city = ").push_bind(city);
        }
        if let Some(channel) = &filter.channel {
            query.push(" AND channel = ").push_bind(channel);
        }
        query.push(" ORDER BY name");

        let customers = query
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Lists soft-deleted customers (the explicit deleted set).
    pub async fn list_deleted(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE deleted_at IS NOT NULL ORDER BY deleted_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Applies a partial update to a live customer.
    pub async fn update(&self, id: &str, patch: &CustomerPatch) -> DbResult<Customer> {
        let Some(mut customer) = self.get_by_id(id).await? else {
            return Err(DbError::not_found("Customer", id));
        };

        if let Some(name) = &patch.name {
            customer.name = name.clone();
        }
        if let Some(city) = &patch.city {
            customer.city = city.clone();
        }
        if let Some(channel) = &patch.channel {
            customer.channel = channel.clone();
        }
        if let Some(media_url) = &patch.media_url {
            customer.media_url = Some(media_url.clone());
        }
        customer.updated_at = Utc::now();

        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                city = ?3,
                channel = ?4,
                media_url = ?5,
                updated_at = ?6
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.city)
        .bind(&customer.channel)
        .bind(&customer.media_url)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(customer)
    }

    /// Soft-deletes a customer by stamping `deleted_at`.
    ///
    /// Historical sales keep their reference; the customer just stops
    /// appearing in live reads and can no longer be sold to.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting customer");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET deleted_at = ?2, updated_at = ?2 \
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
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

    fn new_customer(name: &str, city: &str, channel: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            city: city.to_string(),
            channel: channel.to_string(),
            media_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .insert(&new_customer("Ana Torres", "Valencia", "referral"))
            .await
            .unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Ana Torres");
        assert_eq!(fetched.city, "Valencia");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&new_customer("Ana Torres", "Valencia", "referral"))
            .await
            .unwrap();
        repo.insert(&new_customer("Luis Gil", "Valencia", "walk-in"))
            .await
            .unwrap();
        repo.insert(&new_customer("Marta Ruiz", "Sevilla", "referral"))
            .await
            .unwrap();

        let valencia = repo
            .list(&CustomerFilter {
                city: Some("Valencia".to_string()),
                channel: None,
            })
            .await
            .unwrap();
        assert_eq!(valencia.len(), 2);

        let referral_valencia = repo
            .list(&CustomerFilter {
                city: Some("Valencia".to_string()),
                channel: Some("referral".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(referral_valencia.len(), 1);
        assert_eq!(referral_valencia[0].name, "Ana Torres");
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .insert(&new_customer("Ana Torres", "Valencia", "referral"))
            .await
            .unwrap();

        let patch = CustomerPatch {
            city: Some("Madrid".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.city, "Madrid");
        assert_eq!(updated.name, "Ana Torres");

        repo.soft_delete(&created.id).await.unwrap();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert_eq!(repo.list_deleted().await.unwrap().len(), 1);

        // Double delete reports not found
        let err = repo.soft_delete(&created.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
