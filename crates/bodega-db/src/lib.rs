//! # bodega-db
//!
//! SQLite storage for the Bodega backend, built on sqlx.
//!
//! The crate owns the connection pool ([`pool::Database`]), the embedded
//! schema migrations, and one repository per entity. The only piece with
//! real design weight is the **sale transaction coordinator** in
//! [`repository::sale`]: a two-pass validate-then-mutate flow that
//! commits a multi-line sale (stock decrements included) as a single
//! transaction.
//!
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/bodega.db")).await?;
//!
//! let products = db.products().list(&Default::default()).await?;
//! let receipt = db.sales().create_sale(&customer_id, channel, &lines).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{CheckoutError, DbError};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::customer::{CustomerFilter, CustomerRepository};
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::sale::{SaleFilter, SaleRepository};
