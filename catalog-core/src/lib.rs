pub mod common;
pub mod domain;
pub mod geo;
pub mod query;
pub mod storage;

#[cfg(feature = "db")]
pub mod database;

pub use common::error::{CatalogError, Result};
pub use domain::*;
pub use query::CatalogQuery;
pub use storage::Storage;

#[cfg(feature = "db")]
pub use database::DatabaseManager;
#[cfg(feature = "db")]
pub use storage::SqliteStorage;
