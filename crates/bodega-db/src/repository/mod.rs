//! Entity repositories.
//!
//! One repository per entity, each a cheap clone over the shared pool,
//! keeping all SQL for that entity in one file. Every read path excludes
//! soft-deleted rows; the deleted set is only reachable through the
//! explicit `list_deleted` calls.
//!
//! - [`category::CategoryRepository`] — CRUD, deactivation, product grouping
//! - [`product::ProductRepository`] — CRUD, filtered listing, stock ops
//! - [`customer::CustomerRepository`] — CRUD, filtered listing
//! - [`sale::SaleRepository`] — lookups plus the sale transaction
//!   coordinator

pub mod category;
pub mod customer;
pub mod product;
pub mod sale;
