//! User management commands.
//!
//! ```bash
//! sk-cli user create -e clerk@example.com -p 'correct horse'
//! ```

use shelfkeeper_core::UserId;
use shelfkeeper_inventory::db;
use shelfkeeper_inventory::services::{AuthError, AuthService};

use super::{ConnectError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("schema migration failed: {0}")]
    Schema(#[from] db::SchemaError),

    #[error("a user already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a new user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError::UserExists` if the email is taken, or `UserError::Auth`
/// for an invalid email, an empty password or a database failure.
pub async fn create_user(
    database_url: Option<&str>,
    email: &str,
    password: &str,
) -> Result<UserId, UserError> {
    let (_, pool) = connect(database_url).await?;
    db::ensure_schema(&pool).await?;

    let user = AuthService::new(&pool)
        .register(email, password)
        .await
        .map_err(|e| match e {
            AuthError::DuplicateEmail => UserError::UserExists(email.trim().to_lowercase()),
            other => UserError::Auth(other),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "User created");
    Ok(user.id)
}
