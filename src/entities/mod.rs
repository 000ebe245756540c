//! Persistent records for the catalog, directory, customers, orders and promotions.
//!
//! User accounts live in [`crate::auth::user`].

pub mod category;
pub mod customer;
pub mod discount;
pub mod employee;
pub mod item_sold;
pub mod location;
pub mod order;
pub mod product;
pub mod transaction;
pub mod types;
pub mod variation;
