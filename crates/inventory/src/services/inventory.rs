//! Inventory operations.
//!
//! Form input arrives as raw text. [`InventoryService::add_product`] validates
//! it, normalizes the photo, stores the original upload and only then inserts,
//! so a rejected photo never leaves a row behind. If the insert fails the
//! stored upload is removed again.

use sqlx::SqlitePool;
use thiserror::Error;

use shelfkeeper_core::{LowStockThreshold, Price, ProductId, Quantity, StockError, StoragePosition};

use super::images::{self, ImageError};
use super::uploads::{StoredUpload, UploadError, UploadStore};
use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::{LowStockItem, NewProduct, Product};

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Quantity or price is not acceptable.
    #[error(transparent)]
    Validation(#[from] StockError),

    /// The product name is blank.
    #[error("product name cannot be empty")]
    EmptyName,

    /// The uploaded photo could not be decoded.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The upload could not be written to disk.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl InventoryError {
    /// Whether the error was caused by user input rather than the server.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::EmptyName | Self::Image(ImageError::Decode(_))
        )
    }
}

/// Raw "add product" input, as submitted by the form.
#[derive(Debug, Clone, Default)]
pub struct AddProductInput {
    pub name: String,
    pub quantity: String,
    pub price: String,
    /// Shelf column.
    pub column: String,
    /// Shelf level ("Linha").
    pub row: String,
    /// Position label within the slot, e.g. "left".
    pub position: String,
    /// Photo bytes; `None` or empty means no photo.
    pub image: Option<Vec<u8>>,
}

/// Product operations used by the HTTP handlers and the CLI.
pub struct InventoryService<'a> {
    products: ProductRepository<'a>,
    uploads: &'a UploadStore,
    default_threshold: LowStockThreshold,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        uploads: &'a UploadStore,
        default_threshold: LowStockThreshold,
    ) -> Self {
        Self {
            products: ProductRepository::new(pool),
            uploads,
            default_threshold,
        }
    }

    /// Validate and store a new product.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` for a bad quantity or price,
    /// `InventoryError::EmptyName` for a blank name, and
    /// `InventoryError::Image` if the photo cannot be decoded. In all three
    /// cases nothing is written.
    pub async fn add_product(&self, input: AddProductInput) -> Result<ProductId, InventoryError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }
        let quantity = Quantity::parse(&input.quantity)?;
        let price = Price::parse(&input.price)?;
        let position = StoragePosition::new(&input.column, &input.row, &input.position);

        let photo = input.image.as_deref().filter(|bytes| !bytes.is_empty());
        let image_data = images::encode_optional(photo)?;

        let stored = match photo {
            Some(bytes) => Some(self.uploads.save(bytes).await?),
            None => None,
        };

        let product = NewProduct {
            name: name.to_owned(),
            quantity,
            price,
            position,
            image_data,
            image_path: stored.as_ref().map(StoredUpload::url_path),
        };
        let id = match self.products.insert(&product).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(stored) = &stored {
                    self.uploads.discard(stored).await;
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            product_id = %id,
            name = %product.name,
            quantity = %product.quantity,
            has_image = photo.is_some(),
            "Product added"
        );
        Ok(id)
    }

    /// Look up a product by name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the lookup fails.
    pub async fn find_product(&self, query: &str) -> Result<Option<Product>, InventoryError> {
        Ok(self.products.find_by_exact_normalized_name(query).await?)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the lookup fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, InventoryError> {
        Ok(self.products.get_by_id(id).await?)
    }

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, InventoryError> {
        Ok(self.products.list_all().await?)
    }

    /// List products at or below `threshold`, or the configured default.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the query fails.
    pub async fn list_low_stock(
        &self,
        threshold: Option<LowStockThreshold>,
    ) -> Result<Vec<LowStockItem>, InventoryError> {
        let threshold = threshold.unwrap_or(self.default_threshold);
        Ok(self.products.list_low_stock(threshold).await?)
    }

    /// Threshold used when none is given.
    #[must_use]
    pub const fn default_threshold(&self) -> LowStockThreshold {
        self.default_threshold
    }

    /// Delete a product. Deleting a missing ID succeeds.
    ///
    /// # Returns
    ///
    /// Whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Repository` if the delete fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool, InventoryError> {
        let removed = self.products.delete(id).await?;
        tracing::info!(product_id = %id, removed, "Product delete requested");
        Ok(removed)
    }
}
