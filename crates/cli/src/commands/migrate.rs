//! Schema migration command.
//!
//! ```bash
//! sk-cli migrate
//! ```
//!
//! Applies the same versioned steps the web app runs at startup, and also
//! creates the session table used by the `SQLite` session store.

use shelfkeeper_inventory::db::{self, SchemaError};
use shelfkeeper_inventory::middleware::create_session_store;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("schema migration failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("session table migration failed: {0}")]
    Sessions(#[from] sqlx::Error),
}

/// Bring the configured database up to date.
///
/// # Errors
///
/// Returns `MigrateError` if connecting or any migration step fails.
pub async fn run(database_url: Option<&str>) -> Result<(), MigrateError> {
    let (_, pool) = connect(database_url).await?;

    let report = db::ensure_schema(&pool).await?;
    create_session_store(&pool).await?;

    if report.is_noop() {
        tracing::info!("Schema already up to date");
    } else {
        for step in &report.applied {
            tracing::info!("  applied: {step}");
        }
        tracing::info!(steps = report.applied.len(), "Migration complete");
    }

    Ok(())
}
