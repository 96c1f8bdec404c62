pub use catalog_core::{CatalogError, Result};
