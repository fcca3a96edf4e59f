//! User domain types.

use shelfkeeper_core::{Email, UserId};

/// A login account (domain type).
///
/// The password hash never leaves the repository/auth service pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
}
