use crate::common::error::{CatalogError, Result};
use crate::storage::SqliteStorage;
use libsql::Builder;
use std::env;
use tracing::info;

/// Opens the configured libSQL database and runs migrations. Defaults to a
/// local SQLite file so the pipeline runs with zero external setup; set
/// `DATABASE_URL` to a `libsql://` endpoint (plus `DATABASE_AUTH_TOKEN`) to
/// point at a remote Turso-compatible instance instead.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect() -> Result<SqliteStorage> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| "catalog.db".to_string());

        let db = if let Some(remote_url) = url.strip_prefix("libsql://").map(|_| url.clone()) {
            let auth_token = env::var("DATABASE_AUTH_TOKEN").map_err(|_| CatalogError::Database {
                message: "DATABASE_AUTH_TOKEN must be set when DATABASE_URL is a libsql:// endpoint"
                    .to_string(),
            })?;
            info!(url = %remote_url, "connecting to remote catalog database");
            Builder::new_remote(remote_url, auth_token)
                .build()
                .await
                .map_err(|e| CatalogError::Database {
                    message: format!("failed to connect to remote database: {e}"),
                })?
        } else {
            info!(path = %url, "opening local catalog database");
            Builder::new_local(&url)
                .build()
                .await
                .map_err(|e| CatalogError::Database {
                    message: format!("failed to open local database: {e}"),
                })?
        };

        let storage = SqliteStorage::new(db);
        storage.run_migrations().await?;
        Ok(storage)
    }
}
