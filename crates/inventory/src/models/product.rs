//! Product domain models.

use serde::Serialize;
use shelfkeeper_core::{Price, ProductId, Quantity, StoragePosition};

/// An inventory item as stored in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name, as entered.
    pub name: String,
    /// Units on the shelf.
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
    /// Human-readable location, e.g. "Coluna 3, Linha 2, left".
    pub location: String,
    /// Shelf column, if the row was written by a release that records it.
    ///
    /// The column has `INTEGER` affinity, so numeric-looking labels come back
    /// rewritten ("01" as "1", "2.0" as "2") and may differ from `location`.
    pub stored_column: Option<String>,
    /// Shelf level, if recorded. Same rewriting as `stored_column`.
    pub stored_level: Option<String>,
    /// Base64 PNG photo; empty when the product has none.
    pub image_data: String,
    /// Raw position label captured at insert.
    pub locked_position: Option<String>,
    /// URL of the original uploaded photo, e.g. `/uploads/<uuid>.jpg`.
    pub image_path: Option<String>,
}

impl Product {
    /// Whether a photo is stored for this product.
    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.image_data.is_empty()
    }

    /// Price formatted with two decimals.
    #[must_use]
    pub fn price_display(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// Projection returned by the low-stock listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub location: String,
}

impl LowStockItem {
    /// Price formatted with two decimals.
    #[must_use]
    pub fn price_display(&self) -> String {
        format!("{:.2}", self.price)
    }
}

/// Validated input for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub quantity: Quantity,
    pub price: Price,
    pub position: StoragePosition,
    /// Base64 PNG photo, or empty.
    pub image_data: String,
    /// URL of the original upload kept on disk.
    pub image_path: Option<String>,
}
