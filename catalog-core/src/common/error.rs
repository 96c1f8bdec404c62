use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[cfg(feature = "db")]
    #[error("Database error: {message}")]
    Database { message: String },

    /// A competition's required fields could not be normalized; the
    /// orchestrator skips the event rather than surfacing this upward.
    #[error("normalization rejected event: {0}")]
    Normalization(String),

    /// A scan ran past its configured time budget.
    #[error("scan timed out after {0} seconds")]
    ScanTimeout(u64),

    /// An `insert_venue` call collided with an existing `canonical_name`.
    /// The caller lost a create race and should re-read the winning row
    /// rather than treat this as fatal.
    #[error("venue already exists: {0}")]
    DuplicateVenueName(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
