//! Domain types.
//!
//! The catalog side (Category, Product, Customer) is mutable and
//! soft-deletable; the transaction side (Sale, SaleLine) is written once
//! and never touched again.
//!
//! ```text
//! Category 1──n Product n──1 SaleLine n──1 Sale n──1 Customer
//! ```
//!
//! Three conventions run through every type here:
//!
//! - **Ids are UUIDv4 strings**, generated app-side, never reused.
//! - **Soft delete**: catalog entities carry
//!   `deleted_at: Option<DateTime<Utc>>` — `None` means live. Read paths
//!   filter on it; the "deleted" listings invert the filter. Sales have
//!   no such marker because they are immutable.
//! - **Money is integer cents** (`*_cents: i64` fields, [`Money`] for
//!   arithmetic).
//!
//! The `sqlx` derives on these types are feature-gated so this crate
//! stays I/O-free for anyone not linking the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Sale Channel
// =============================================================================

/// How a sale was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
pub enum SaleChannel {
    /// Over-the-counter sale.
    InPerson,
    /// Online / remote sale.
    Virtual,
}

impl Default for SaleChannel {
    fn default() -> Self {
        SaleChannel::InPerson
    }
}

impl std::fmt::Display for SaleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleChannel::InPerson => write!(f, "in-person"),
            SaleChannel::Virtual => write!(f, "virtual"),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across live categories.
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Whether the category is active (can be toggled without deleting).
    pub is_active: bool,

    /// Public URL of the category image, if one was uploaded.
    pub media_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; `None` = live.
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit), always positive.
    pub price_cents: i64,

    /// Current stock level, never negative.
    pub stock: i64,

    /// Whether the product is active (listed for sale).
    pub is_active: bool,

    /// Public URL of the product image, if one was uploaded.
    pub media_url: Option<String>,

    /// Category this product belongs to.
    pub category_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; `None` = live.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the current price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the current stock covers a requested quantity.
    #[inline]
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who can appear on sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub city: String,
    /// Acquisition channel (free-form tag, e.g. "referral", "walk-in").
    pub channel: String,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Sales are created atomically with their lines and are immutable once
/// written: there is no update, no delete, and no soft-delete marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub channel: SaleChannel,
    /// Derived total: Σ quantity × unit price across the lines.
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
///
/// The unit price is frozen at the moment of sale, so later product price
/// changes never rewrite history. A product appears at most once per sale
/// (composite primary key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold, always positive.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
}

impl SaleLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total (quantity × frozen unit price).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Create Inputs
// =============================================================================

/// Fields for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to active when omitted.
    #[serde(default = "default_active")]
    pub active: bool,
    pub media_url: Option<String>,
}

/// Fields for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Defaults to zero stock when omitted.
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category_id: String,
    pub media_url: Option<String>,
}

/// Fields for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub city: String,
    pub channel: String,
    pub media_url: Option<String>,
}

/// One requested line of a new sale: which product, how many units.
///
/// The unit price is *not* part of the request; it is captured from the
/// product inside the transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A sale creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_id: String,
    #[serde(default)]
    pub channel: SaleChannel,
    pub lines: Vec<NewSaleLine>,
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Partial Updates
// =============================================================================

/// Partial update for a category; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub media_url: Option<String>,
}

/// Partial update for a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub active: Option<bool>,
    pub category_id: Option<String>,
    pub media_url: Option<String>,
}

/// Partial update for a customer; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub channel: Option<String>,
    pub media_url: Option<String>,
}

// =============================================================================
// Read Models
// =============================================================================
// API response shapes. These are read models assembled from storage rows,
// not the storage schema itself.

/// Product row joined with its category name, for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: Product,
    /// Name of the product's category.
    pub category: String,
}

/// Product with its full category attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// Category with its live products attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// The product snapshot nested inside a sale line response:
/// identity plus the *current* price for comparison against the
/// frozen line price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductBrief {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

/// One line of a sale receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLineDetail {
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price frozen at time of sale.
    pub unit_price_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: ProductBrief,
}

/// A sale with customer and lines eagerly attached.
///
/// This is what `create_sale` returns (read-after-write) and what the
/// sale lookup endpoint serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReceipt {
    #[serde(flatten)]
    pub sale: Sale,
    pub customer: Customer,
    pub lines: Vec<SaleLineDetail>,
}

// =============================================================================
// Unit Tests
// =============================================================================
