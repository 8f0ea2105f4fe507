//! # Sale Repository
//!
//! Sale lookups and the **sale transaction coordinator**.
//!
//! ## Sale Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_sale(customer, channel, lines)                │
//! │                                                                         │
//! │  0. REJECT EARLY                                                       │
//! │     └── empty line list, non-positive quantities                       │
//! │                                                                         │
//! │  1. BEGIN TRANSACTION                                                  │
//! │                                                                         │
//! │  2. VALIDATION PASS (reads only)                                       │
//! │     ├── customer exists and is live                                    │
//! │     └── for each line: product exists, is live, stock ≥ quantity       │
//! │                                                                         │
//! │  3. TOTAL = Σ quantity × current unit price  (captured once)           │
//! │                                                                         │
//! │  4. MUTATION PASS (writes only)                                        │
//! │     ├── INSERT sale                                                    │
//! │     └── for each line: UPDATE stock -= quantity, INSERT sale_line      │
//! │                                                                         │
//! │  5. COMMIT — or roll the whole thing back on any failure               │
//! │                                                                         │
//! │  6. READ-AFTER-WRITE                                                   │
//! │     └── reload the sale with customer + lines eagerly attached         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The validation pass and the mutation pass are two separate loops on
//! purpose. Fusing them would still roll back on failure, but keeping the
//! phases distinct makes the all-or-nothing guarantee legible and lets the
//! tests pin it down.
//!
//! ## Concurrency
//! The product rows read in the validation pass are not locked; between
//! the stock check and the decrement nothing in the application prevents a
//! competing writer. The coordinator relies entirely on the storage
//! engine's isolation — SQLite serializes write transactions, and the
//! schema's `CHECK (stock >= 0)` turns an underflow into a rolled-back
//! storage error rather than negative stock. Swapping in a storage engine
//! with weaker write isolation would need row locking or a version column
//! here.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CheckoutError, DbError, DbResult};
use bodega_core::validation::validate_quantity;
use bodega_core::{
    CoreError, Customer, Money, NewSaleLine, Product, Sale, SaleChannel, SaleLine, SaleLineDetail,
    SaleReceipt,
};

/// Optional filters for sale listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    /// Only sales for this customer.
    pub customer_id: Option<String>,
    /// Only sales made through this channel.
    pub channel: Option<SaleChannel>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a multi-line sale atomically.
    ///
    /// Validates every line before mutating anything, freezes each
    /// product's current price as the line's unit price, decrements stock,
    /// and commits sale + lines as one unit. Either everything lands or
    /// nothing does.
    ///
    /// ## Errors
    /// * `CheckoutError::Rejected` - business rule violation: unknown or
    ///   deleted customer/product, insufficient stock, empty line list,
    ///   non-positive quantity. Nothing was written.
    /// * `CheckoutError::Storage` - the storage layer failed; the
    ///   transaction was rolled back.
    ///
    /// ## Not Idempotent
    /// Submitting the same request twice creates two sales and decrements
    /// stock twice. Deduplication is the caller's problem, if it is one.
    pub async fn create_sale(
        &self,
        customer_id: &str,
        channel: SaleChannel,
        lines: &[NewSaleLine],
    ) -> Result<SaleReceipt, CheckoutError> {
        if lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }
        for line in lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        debug!(customer_id = %customer_id, lines = lines.len(), "Opening sale transaction");

        // Everything from here to commit() runs on one connection; any
        // early return drops the transaction, which rolls it back.
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, city, channel, media_url, created_at, updated_at, deleted_at \
             FROM customers WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(customer) = customer else {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        };

        // Validation pass: check every line before touching any row.
        // A missing product and a soft-deleted one fail identically.
        let mut picked: Vec<(Product, i64)> = Vec::with_capacity(lines.len());
        for line in lines {
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, name, description, price_cents, stock, is_active, \
                        media_url, category_id, created_at, updated_at, deleted_at \
                 FROM products WHERE id = ?1 AND deleted_at IS NULL",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(product) = product else {
                return Err(CoreError::ProductNotFound(line.product_id.clone()).into());
            };

            if !product.in_stock(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            picked.push((product, line.quantity));
        }

        // Unit prices are captured here, once; the mutation pass and the
        // stored lines never re-read them.
        let total: Money = picked
            .iter()
            .map(|(product, quantity)| product.price().multiply_quantity(*quantity))
            .sum();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            channel,
            total_cents: total.cents(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO sales (id, customer_id, channel, total_cents, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(sale.channel)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        // Mutation pass: decrement stock and persist the lines.
        for (product, quantity) in &picked {
            sqlx::query(
                "UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(&product.id)
            .bind(quantity)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await?;

            let line = SaleLine {
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                quantity: *quantity,
                unit_price_cents: product.price_cents,
            };

            sqlx::query(
                "INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price_cents) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&line.sale_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            customer_id = %customer.id,
            total = %total,
            lines = picked.len(),
            "Sale committed"
        );

        // Read-after-write: hand back the fully resolved receipt instead
        // of leaving relation loading to the caller.
        self.get_by_id(&sale.id)
            .await?
            .ok_or_else(|| DbError::Internal("committed sale not readable".to_string()).into())
    }

    /// Gets a sale with customer and lines eagerly attached.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleReceipt>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, customer_id, channel, total_cents, created_at FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        // The customer is resolved even if soft-deleted since the sale;
        // receipts stay renderable forever.
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, city, channel, media_url, created_at, updated_at, deleted_at \
             FROM customers WHERE id = ?1",
        )
        .bind(&sale.customer_id)
        .fetch_one(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, SaleLineDetail>(
            "SELECT sl.quantity, sl.unit_price_cents, p.id, p.name, p.price_cents \
             FROM sale_lines sl \
             INNER JOIN products p ON p.id = sl.product_id \
             WHERE sl.sale_id = ?1 \
             ORDER BY sl.rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SaleReceipt {
            sale,
            customer,
            lines,
        }))
    }

    /// Lists sales, newest first, optionally filtered.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, customer_id, channel, total_cents, created_at FROM sales WHERE 1 = 1",
        );

        if let Some(customer_id) = &filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(channel) = filter.channel {
            query.push(" AND channel = ").push_bind(channel);
        }
        query.push(" ORDER BY created_at DESC");

        let sales = query.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bodega_core::{NewCategory, NewCustomer, NewProduct, ProductPatch};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database) -> Customer {
        db.customers()
            .insert(&NewCustomer {
                name: "Ana Torres".to_string(),
                city: "Valencia".to_string(),
                channel: "referral".to_string(),
                media_url: None,
            })
            .await
            .unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let category = db
            .categories()
            .insert(&NewCategory {
                name: format!("Category for {name}"),
                description: None,
                active: true,
                media_url: None,
            })
            .await
            .unwrap();

        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                description: None,
                price_cents,
                stock,
                active: true,
                category_id: category.id,
                media_url: None,
            })
            .await
            .unwrap()
    }

    fn line(product: &Product, quantity: i64) -> NewSaleLine {
        NewSaleLine {
            product_id: product.id.clone(),
            quantity,
        }
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_multi_line_sale_totals_and_stock() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;
        let b = seed_product(&db, "Product B", 200, 3).await;

        let receipt = db
            .sales()
            .create_sale(
                &customer.id,
                SaleChannel::InPerson,
                &[line(&a, 2), line(&b, 3)],
            )
            .await
            .unwrap();

        // total = 2 × 500 + 3 × 200 = 1600
        assert_eq!(receipt.sale.total_cents, 1600);
        assert_eq!(receipt.sale.channel, SaleChannel::InPerson);
        assert_eq!(receipt.customer.id, customer.id);
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].product.id, a.id);
        assert_eq!(receipt.lines[0].unit_price_cents, 500);
        assert_eq!(receipt.lines[1].quantity, 3);

        assert_eq!(stock_of(&db, &a.id).await, 8);
        assert_eq!(stock_of(&db, &b.id).await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_everything_back() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;
        let b = seed_product(&db, "Product B", 200, 3).await;

        // Second line over-asks; the first line must not leave a trace.
        let err = db
            .sales()
            .create_sale(
                &customer.id,
                SaleChannel::InPerson,
                &[line(&a, 2), line(&b, 4)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            })
        ));

        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert_eq!(stock_of(&db, &b.id).await, 3);
        assert!(db.sales().list(&SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_fails_the_same_way() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;

        let err = db
            .sales()
            .create_sale(
                &customer.id,
                SaleChannel::Virtual,
                &[
                    line(&a, 1),
                    NewSaleLine {
                        product_id: "no-such-product".to_string(),
                        quantity: 1,
                    },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::ProductNotFound(_))
        ));
        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert!(db.sales().list(&SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_product_is_not_sellable() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;
        db.products().soft_delete(&a.id).await.unwrap();

        let err = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[line(&a, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_or_deleted_customer_rejected() {
        let db = test_db().await;
        let a = seed_product(&db, "Product A", 500, 10).await;

        let err = db
            .sales()
            .create_sale("no-such-customer", SaleChannel::InPerson, &[line(&a, 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::CustomerNotFound(_))
        ));

        let customer = seed_customer(&db).await;
        db.customers().soft_delete(&customer.id).await.unwrap();

        let err = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[line(&a, 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::CustomerNotFound(_))
        ));

        assert_eq!(stock_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_empty_sale_rejected() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;

        let err = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Rejected(CoreError::EmptySale)));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;

        let err = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[line(&a, 0)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::Validation(_))
        ));
        assert_eq!(stock_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_sales_are_not_idempotent() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;

        let first = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[line(&a, 2)])
            .await
            .unwrap();
        let second = db
            .sales()
            .create_sale(&customer.id, SaleChannel::InPerson, &[line(&a, 2)])
            .await
            .unwrap();

        // Two distinct sales, double decrement — by design.
        assert_ne!(first.sale.id, second.sale.id);
        assert_eq!(stock_of(&db, &a.id).await, 6);
        assert_eq!(
            db.sales().list(&SaleFilter::default()).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_unit_price_is_frozen_at_sale_time() {
        let db = test_db().await;
        let customer = seed_customer(&db).await;
        let a = seed_product(&db, "Product A", 500, 10).await;

        let receipt = db
            .sales()
            .create_sale(&customer.id, SaleChannel::Virtual, &[line(&a, 1)])
            .await
            .unwrap();

        // Raise the price after the sale
        db.products()
            .update(
                &a.id,
                &ProductPatch {
                    price_cents: Some(999),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reread = db.sales().get_by_id(&receipt.sale.id).await.unwrap().unwrap();
        assert_eq!(reread.lines[0].unit_price_cents, 500);
        // The nested snapshot carries the *current* price for comparison
        assert_eq!(reread.lines[0].product.price_cents, 999);
        assert_eq!(reread.sale.total_cents, 500);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let ana = seed_customer(&db).await;
        let luis = db
            .customers()
            .insert(&NewCustomer {
                name: "Luis Gil".to_string(),
                city: "Sevilla".to_string(),
                channel: "walk-in".to_string(),
                media_url: None,
            })
            .await
            .unwrap();
        let a = seed_product(&db, "Product A", 500, 10).await;

        db.sales()
            .create_sale(&ana.id, SaleChannel::InPerson, &[line(&a, 1)])
            .await
            .unwrap();
        db.sales()
            .create_sale(&luis.id, SaleChannel::Virtual, &[line(&a, 1)])
            .await
            .unwrap();

        let by_customer = db
            .sales()
            .list(&SaleFilter {
                customer_id: Some(ana.id.clone()),
                channel: None,
            })
            .await
            .unwrap();
        assert_eq!(by_customer.len(), 1);
        assert_eq!(by_customer[0].customer_id, ana.id);

        let virtual_only = db
            .sales()
            .list(&SaleFilter {
                customer_id: None,
                channel: Some(SaleChannel::Virtual),
            })
            .await
            .unwrap();
        assert_eq!(virtual_only.len(), 1);
        assert_eq!(virtual_only[0].channel, SaleChannel::Virtual);
    }

    #[tokio::test]
    async fn test_get_missing_sale_is_none() {
        let db = test_db().await;
        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }
}
