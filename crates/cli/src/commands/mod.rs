//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use shelfkeeper_inventory::config::{ConfigError, InventoryConfig};
use shelfkeeper_inventory::db;
use sqlx::SqlitePool;

/// Errors shared by commands that open the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load configuration and open the database it points at.
///
/// `database_url` overrides the URL from the environment.
///
/// # Errors
///
/// Returns `ConnectError` if the environment is invalid or the database
/// cannot be opened.
pub async fn connect(
    database_url: Option<&str>,
) -> Result<(InventoryConfig, SqlitePool), ConnectError> {
    dotenvy::dotenv().ok();

    let mut config = InventoryConfig::from_env()?;
    if let Some(url) = database_url {
        config.database_url = SecretString::from(url.to_owned());
    }

    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}
