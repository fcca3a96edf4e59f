//! Product repository for database operations.
//!
//! Position components live in `INTEGER`-affinity columns but may hold labels
//! such as "A", so they are always read back through `CAST(... AS TEXT)`.
//!
//! `name_key` holds [`normalize_product_name`] of the name and is what exact
//! lookups compare against.

use sqlx::SqlitePool;

use shelfkeeper_core::{LowStockThreshold, ProductId, normalize_product_name};

use super::RepositoryError;
use crate::models::product::{LowStockItem, NewProduct, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

const PRODUCT_COLUMNS: &str = r"
    id, name,
    CAST(quantity AS INTEGER) AS quantity,
    CAST(price AS REAL) AS price,
    location,
    CAST(stored_column AS TEXT) AS stored_column,
    CAST(stored_level AS TEXT) AS stored_level,
    image_data, locked_position, image_path
";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    quantity: i64,
    price: f64,
    location: String,
    stored_column: Option<String>,
    stored_level: Option<String>,
    image_data: Option<String>,
    locked_position: Option<String>,
    image_path: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            quantity: row.quantity,
            price: row.price,
            location: row.location,
            stored_column: row.stored_column,
            stored_level: row.stored_level,
            image_data: row.image_data.unwrap_or_default(),
            locked_position: row.locked_position,
            image_path: row.image_path,
        }
    }
}

/// Internal row type for the low-stock projection.
#[derive(Debug, sqlx::FromRow)]
struct LowStockRow {
    name: String,
    quantity: i64,
    price: f64,
    location: String,
}

impl From<LowStockRow> for LowStockItem {
    fn from(row: LowStockRow) -> Self {
        Self {
            name: row.name,
            quantity: row.quantity,
            price: row.price,
            location: row.location,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a product and return its ID.
    ///
    /// `location` is derived from the position; `locked_position` records the
    /// raw position label; `name_key` is the normalized name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO products (
                name, quantity, price, location,
                stored_column, stored_level, image_data, locked_position,
                name_key, image_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&product.name)
        .bind(product.quantity.get())
        .bind(product.price.get())
        .bind(product.position.location())
        .bind(&product.position.column)
        .bind(&product.position.level)
        .bind(&product.image_data)
        .bind(&product.position.label)
        .bind(normalize_product_name(&product.name))
        .bind(&product.image_path)
        .execute(self.pool)
        .await?;

        Ok(ProductId::new(result.last_insert_rowid()))
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Find the first product whose normalized name equals the normalized query.
    ///
    /// The query goes through [`normalize_product_name`] and is compared with
    /// the stored `name_key`, so matching is Unicode-aware rather than limited
    /// to `SQLite`'s ASCII `LOWER`. Duplicate names are allowed; the lowest ID
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_exact_normalized_name(
        &self,
        query: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let key = normalize_product_name(query);
        if key.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name_key = ? ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// List every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List products whose quantity is at or below `threshold`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_low_stock(
        &self,
        threshold: LowStockThreshold,
    ) -> Result<Vec<LowStockItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r"
            SELECT name,
                   CAST(quantity AS INTEGER) AS quantity,
                   CAST(price AS REAL) AS price,
                   location
            FROM products
            WHERE quantity <= ?
            ORDER BY id
            ",
        )
        .bind(threshold.get())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(LowStockItem::from).collect())
    }

    /// Delete a product by ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed, `false` if none existed. A missing
    /// ID is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
