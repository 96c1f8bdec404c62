pub mod traits;

#[cfg(feature = "db")]
pub mod sqlite;

pub mod memory;

pub use traits::{CompetitionFilter, Storage};

#[cfg(feature = "db")]
pub use sqlite::SqliteStorage;

pub use memory::MemoryStorage;
