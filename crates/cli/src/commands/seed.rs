//! Seed the inventory with products from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Widget
//!     quantity: 10
//!     price: 9.99
//!     column: A
//!     row: 1
//!     position: left
//!     image: photos/widget.jpg   # optional, relative to the YAML file
//! ```
//!
//! Each entry goes through the same validation as the web form. A bad entry
//! is reported and skipped; the rest are still inserted.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use shelfkeeper_core::LowStockThreshold;
use shelfkeeper_inventory::db;
use shelfkeeper_inventory::services::{AddProductInput, InventoryService, UploadStore};

use super::connect;

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub column: Label,
    pub row: Label,
    pub position: String,
    #[serde(default)]
    pub image: Option<PathBuf>,
}

/// A shelf label, written in YAML as either a number or text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Number(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub inserted: usize,
    pub errors: Vec<(String, String)>,
}

/// Seed products from `file` into the configured database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// cannot be opened. Per-product failures are logged and counted instead.
pub async fn products(
    database_url: Option<&str>,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    info!(path = %file.display(), "Loading products from file");
    let content = tokio::fs::read_to_string(file).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(products = seed.products.len(), "Parsed seed file");

    let (config, pool) = connect(database_url).await?;
    db::ensure_schema(&pool).await?;

    let uploads = UploadStore::new(config.upload_dir.clone());
    let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
    let summary = seed_products(&pool, &uploads, seed, base_dir).await;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    if !summary.errors.is_empty() {
        error!("  Errors: {}", summary.errors.len());
        for (name, err) in &summary.errors {
            error!("    - {name}: {err}");
        }
    }

    Ok(())
}

/// Insert every product in `seed`. Image paths are resolved against `base_dir`.
pub async fn seed_products(
    pool: &SqlitePool,
    uploads: &UploadStore,
    seed: SeedFile,
    base_dir: &Path,
) -> SeedSummary {
    let inventory = InventoryService::new(pool, uploads, LowStockThreshold::DEFAULT);
    let mut summary = SeedSummary::default();

    for product in seed.products {
        let name = product.name.clone();

        let image = match &product.image {
            Some(path) => match tokio::fs::read(base_dir.join(path)).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    summary
                        .errors
                        .push((name, format!("cannot read {}: {e}", path.display())));
                    continue;
                }
            },
            None => None,
        };

        let input = AddProductInput {
            name: product.name,
            quantity: product.quantity.to_string(),
            price: product.price.to_string(),
            column: product.column.to_string(),
            row: product.row.to_string(),
            position: product.position,
            image,
        };

        match inventory.add_product(input).await {
            Ok(id) => {
                info!(product_id = %id, name = %name, "Seeded product");
                summary.inserted += 1;
            }
            Err(e) => summary.errors.push((name, e.to_string())),
        }
    }

    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r"
products:
  - name: Widget
    quantity: 10
    price: 9.99
    column: A
    row: 1
    position: left
  - name: Bolt
    quantity: 1
    price: 0.5
    column: 3
    row: 2
    position: right
  - name: Broken
    quantity: -4
    price: 1
    column: 1
    row: 1
    position: left
";

    #[tokio::test]
    async fn test_seed_inserts_valid_products() {
        let pool = db::create_in_memory_pool().await.unwrap();
        db::ensure_schema(&pool).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads"));

        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let summary = seed_products(&pool, &uploads, seed, dir.path()).await;

        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].0, "Broken");

        let inventory = InventoryService::new(&pool, &uploads, LowStockThreshold::DEFAULT);
        let bolt = inventory.find_product("bolt").await.unwrap().unwrap();
        assert_eq!(bolt.location, "Coluna 3, Linha 2, right");
        assert_eq!(bolt.stored_column.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_missing_image_is_reported() {
        let pool = db::create_in_memory_pool().await.unwrap();
        db::ensure_schema(&pool).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads"));

        let seed: SeedFile = serde_yaml::from_str(
            r"
products:
  - name: Ghost
    quantity: 1
    price: 1
    column: A
    row: 1
    position: left
    image: nope.png
",
        )
        .unwrap();
        let summary = seed_products(&pool, &uploads, seed, dir.path()).await;

        assert_eq!(summary.inserted, 0);
        assert!(summary.errors[0].1.contains("nope.png"));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Number(3).to_string(), "3");
        assert_eq!(Label::Text("A".to_owned()).to_string(), "A");
    }
}
