//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shelfkeeper_core::EmailError),

    /// Registration attempted with an empty password.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// The email is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the error was caused by user input rather than the server.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::EmptyPassword | Self::DuplicateEmail
        )
    }
}
