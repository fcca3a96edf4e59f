//! User repository for database operations.
//!
//! The `password` column holds an Argon2 PHC string. It is only handed out by
//! [`UserRepository::get_credentials`] so the auth service can verify it.

use sqlx::SqlitePool;

use shelfkeeper_core::{Email, UserId};

use super::{RepositoryError, conflict_or_database};
use crate::models::user::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
        })
    }
}

/// Internal row type for credential lookups.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    email: String,
    password: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let result = sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
            .bind(email)
            .bind(password_hash)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_or_database(e, "email"))?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            email: email.clone(),
        })
    }

    /// Get a user and their stored password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, password FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let user = User::try_from(UserRow {
                id: r.id,
                email: r.email,
            })?;
            Ok((user, r.password))
        })
        .transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{create_in_memory_pool, ensure_schema};

    async fn setup() -> SqlitePool {
        let pool = create_in_memory_pool().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = setup().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("clerk@example.com").unwrap();

        let user = repo.create(&email, "$argon2id$stub").await.unwrap();
        assert_eq!(user.email, email);

        let (found, hash) = repo.get_credentials(&email).await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(hash, "$argon2id$stub");

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id, user);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let pool = setup().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("clerk@example.com").unwrap();

        repo.create(&email, "first").await.unwrap();
        let err = repo.create(&email, "second").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (_, hash) = repo.get_credentials(&email).await.unwrap().unwrap();
        assert_eq!(hash, "first");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let pool = setup().await;
        let repo = UserRepository::new(&pool);
        let email = Email::parse("nobody@example.com").unwrap();

        assert!(repo.get_credentials(&email).await.unwrap().is_none());
        assert!(repo.get_by_id(UserId::new(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_email_is_reported() {
        let pool = setup().await;
        sqlx::query("INSERT INTO users (email, password) VALUES ('not-an-email', 'x')")
            .execute(&pool)
            .await
            .unwrap();

        let err = UserRepository::new(&pool)
            .get_by_id(UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
