pub mod catalog;
pub mod customer;
pub mod sales;

pub use catalog::{Catalog, CatalogDetails, CatalogKind, CatalogPick, ItemAttributes};
pub use customer::Customer;
pub use sales::{discounted_total, round_money, Batch, SaleLine, SalesRecord, SalesRow};
