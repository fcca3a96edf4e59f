//! Schema manager: brings any earlier version of the store up to date.
//!
//! The schema is described as an ordered list of [`Migration`]s. Every step is
//! idempotent and checks the live schema before acting, so the list can be
//! replayed against a fresh file, a current store, or a store created by an
//! older release that lacks the later `products` columns. Steps only ever add
//! tables, columns or indexes; nothing is dropped or renamed. The one data
//! step fills `products.name_key` for rows written before that column existed.

use shelfkeeper_core::normalize_product_name;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

/// Errors from schema evolution. Any of these is fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A schema inspection or alteration statement failed.
    #[error("migration '{step}' failed: {source}")]
    Step {
        /// Name of the failing step.
        step: &'static str,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// Opening or committing the migration transaction failed.
    #[error("schema transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),
}

/// One additive schema change.
#[derive(Debug, Clone, Copy)]
pub enum MigrationStep {
    /// Create a table unless a table with that name exists.
    CreateTable {
        table: &'static str,
        ddl: &'static str,
    },
    /// Add a nullable column unless the table already has it.
    AddColumn {
        table: &'static str,
        column: &'static str,
        sql_type: &'static str,
    },
    /// Create an index unless an index with that name exists.
    CreateIndex {
        index: &'static str,
        ddl: &'static str,
    },
    /// Set `products.name_key` on rows where it is still NULL.
    BackfillNameKeys,
}

/// A named, versioned schema step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub step: MigrationStep,
}

/// The full schema history, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        step: MigrationStep::CreateTable {
            table: "users",
            ddl: r"
                CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL
                )
            ",
        },
    },
    Migration {
        version: 2,
        name: "create_products",
        step: MigrationStep::CreateTable {
            table: "products",
            ddl: r"
                CREATE TABLE products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    quantity INTEGER NOT NULL,
                    price REAL NOT NULL,
                    location TEXT NOT NULL
                )
            ",
        },
    },
    Migration {
        version: 3,
        name: "products_add_stored_column",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "stored_column",
            sql_type: "INTEGER",
        },
    },
    Migration {
        version: 4,
        name: "products_add_stored_level",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "stored_level",
            sql_type: "INTEGER",
        },
    },
    Migration {
        version: 5,
        name: "products_add_image_data",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "image_data",
            sql_type: "TEXT",
        },
    },
    Migration {
        version: 6,
        name: "products_add_locked_position",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "locked_position",
            sql_type: "TEXT",
        },
    },
    Migration {
        version: 7,
        name: "products_add_name_key",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "name_key",
            sql_type: "TEXT",
        },
    },
    Migration {
        version: 8,
        name: "products_index_name_key",
        step: MigrationStep::CreateIndex {
            index: "idx_products_name_key",
            ddl: "CREATE INDEX idx_products_name_key ON products (name_key, id)",
        },
    },
    Migration {
        version: 9,
        name: "products_backfill_name_key",
        step: MigrationStep::BackfillNameKeys,
    },
    Migration {
        version: 10,
        name: "products_add_image_path",
        step: MigrationStep::AddColumn {
            table: "products",
            column: "image_path",
            sql_type: "TEXT",
        },
    },
];

/// What a call to [`ensure_schema`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Names of the steps that altered the store, in order.
    pub applied: Vec<&'static str>,
}

impl SchemaReport {
    /// Whether the store was already current.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Bring the store up to the current schema.
///
/// Runs every step of [`MIGRATIONS`] inside one transaction; a failing step
/// rolls back the whole run.
///
/// # Errors
///
/// Returns `SchemaError` if inspecting or altering the schema fails.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<SchemaReport, SchemaError> {
    let mut tx = pool.begin().await?;
    let mut report = SchemaReport::default();

    for migration in MIGRATIONS {
        let applied = apply(&mut *tx, migration)
            .await
            .map_err(|source| SchemaError::Step {
                step: migration.name,
                source,
            })?;

        if applied {
            tracing::info!(
                version = migration.version,
                step = migration.name,
                "Applied schema migration"
            );
            report.applied.push(migration.name);
        }
    }

    tx.commit().await?;

    if report.is_noop() {
        tracing::debug!("Schema already current");
    }

    Ok(report)
}

/// Apply a single step if the live schema needs it. Returns whether it ran.
async fn apply(conn: &mut SqliteConnection, migration: &Migration) -> Result<bool, sqlx::Error> {
    match migration.step {
        MigrationStep::CreateTable { table, ddl } => {
            if object_exists(&mut *conn, "table", table).await? {
                return Ok(false);
            }
            sqlx::query(ddl).execute(&mut *conn).await?;
            Ok(true)
        }
        MigrationStep::CreateIndex { index, ddl } => {
            if object_exists(&mut *conn, "index", index).await? {
                return Ok(false);
            }
            sqlx::query(ddl).execute(&mut *conn).await?;
            Ok(true)
        }
        MigrationStep::BackfillNameKeys => backfill_name_keys(conn).await,
        MigrationStep::AddColumn {
            table,
            column,
            sql_type,
        } => {
            let columns = columns_on(&mut *conn, table).await?;
            if columns.iter().any(|c| c == column) {
                return Ok(false);
            }
            // Identifiers come from the static list above, never from input.
            let ddl = format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type}");
            sqlx::query(&ddl).execute(&mut *conn).await?;
            Ok(true)
        }
    }
}

async fn object_exists(
    conn: &mut SqliteConnection,
    kind: &str,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = ? AND name = ?")
            .bind(kind)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

/// The key is computed in Rust so it matches `normalize_product_name` exactly;
/// `SQLite`'s `LOWER` only folds ASCII.
async fn backfill_name_keys(conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, name FROM products WHERE name_key IS NULL")
            .fetch_all(&mut *conn)
            .await?;

    for (id, name) in &rows {
        sqlx::query("UPDATE products SET name_key = ? WHERE id = ?")
            .bind(normalize_product_name(name))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(!rows.is_empty())
}

async fn columns_on(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// The live column names of `table`, in declaration order.
///
/// Returns an empty list for a table that does not exist.
///
/// # Errors
///
/// Returns `sqlx::Error` if the schema cannot be read.
pub async fn live_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    columns_on(&mut *conn, table).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_in_memory_pool;

    const PRODUCT_COLUMNS: &[&str] = &[
        "id",
        "name",
        "quantity",
        "price",
        "location",
        "stored_column",
        "stored_level",
        "image_data",
        "locked_position",
        "name_key",
        "image_path",
    ];

    /// Every step except the backfill, which has nothing to do on an empty store.
    fn structural_steps() -> Vec<&'static str> {
        MIGRATIONS
            .iter()
            .filter(|m| !matches!(m.step, MigrationStep::BackfillNameKeys))
            .map(|m| m.name)
            .collect()
    }

    #[tokio::test]
    async fn test_fresh_store_gets_every_step() {
        let pool = create_in_memory_pool().await.unwrap();

        let report = ensure_schema(&pool).await.unwrap();

        assert_eq!(report.applied, structural_steps());
        assert_eq!(live_columns(&pool, "products").await.unwrap(), PRODUCT_COLUMNS);
        assert_eq!(
            live_columns(&pool, "users").await.unwrap(),
            ["id", "email", "password"]
        );
    }

    #[tokio::test]
    async fn test_second_run_is_noop_with_identical_columns() {
        let pool = create_in_memory_pool().await.unwrap();

        ensure_schema(&pool).await.unwrap();
        let first = live_columns(&pool, "products").await.unwrap();

        let report = ensure_schema(&pool).await.unwrap();
        let second = live_columns(&pool, "products").await.unwrap();

        assert!(report.is_noop());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_legacy_products_table_is_upgraded_without_data_loss() {
        let pool = create_in_memory_pool().await.unwrap();
        sqlx::query(
            r"
            CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                location TEXT NOT NULL,
                image_data TEXT
            )
            ",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO products (name, quantity, price, location) VALUES ('Bolt', 4, 0.5, 'Coluna 1, Linha 1, left')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let report = ensure_schema(&pool).await.unwrap();

        assert_eq!(
            report.applied,
            [
                "create_users",
                "products_add_stored_column",
                "products_add_stored_level",
                "products_add_locked_position",
                "products_add_name_key",
                "products_index_name_key",
                "products_backfill_name_key",
                "products_add_image_path",
            ]
        );
        let columns = live_columns(&pool, "products").await.unwrap();
        for column in PRODUCT_COLUMNS {
            assert!(columns.iter().any(|c| c == column), "missing {column}");
        }

        let (name, quantity): (String, i64) =
            sqlx::query_as("SELECT name, quantity FROM products")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(name, "Bolt");
        assert_eq!(quantity, 4);

        let (key,): (String,) = sqlx::query_as("SELECT name_key FROM products")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(key, "bolt");
    }

    #[tokio::test]
    async fn test_failing_step_rolls_back_the_whole_run() {
        let pool = create_in_memory_pool().await.unwrap();
        // A view named `products` is not a table, so the create step runs and fails.
        sqlx::query("CREATE VIEW products AS SELECT 1 AS id")
            .execute(&pool)
            .await
            .unwrap();

        let err = ensure_schema(&pool).await.unwrap_err();

        assert!(
            matches!(err, SchemaError::Step { step: "create_products", .. }),
            "{err:?}"
        );
        assert!(err.to_string().contains("create_products"));
        // `create_users` ran earlier in the same transaction and was undone.
        assert!(live_columns(&pool, "users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_columns_of_missing_table_is_empty() {
        let pool = create_in_memory_pool().await.unwrap();
        assert!(live_columns(&pool, "products").await.unwrap().is_empty());
    }

    #[test]
    fn test_migration_versions_are_increasing() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }
}
