//! Storage positions and product name normalization.

use serde::{Deserialize, Serialize};

/// Where a product sits on the shelving: column, level (row) and a free-text
/// label such as "left" or "right".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoragePosition {
    /// Shelf column, e.g. "3" or "A".
    pub column: String,
    /// Shelf level (row), e.g. "2".
    pub level: String,
    /// Position within the slot, e.g. "left".
    pub label: String,
}

impl StoragePosition {
    /// Create a position, trimming each component.
    #[must_use]
    pub fn new(column: &str, level: &str, label: &str) -> Self {
        Self {
            column: column.trim().to_owned(),
            level: level.trim().to_owned(),
            label: label.trim().to_owned(),
        }
    }

    /// The human-readable location stored in `products.location`.
    ///
    /// ```
    /// use shelfkeeper_core::StoragePosition;
    ///
    /// let position = StoragePosition::new("A", "1", "left");
    /// assert_eq!(position.location(), "Coluna A, Linha 1, left");
    /// ```
    #[must_use]
    pub fn location(&self) -> String {
        format!(
            "Coluna {}, Linha {}, {}",
            self.column, self.level, self.label
        )
    }
}

/// Normalize a product name for lookup: trim, then lowercase.
///
/// Both the stored name and the query go through the same transformation;
/// matching is equality on the result, never substring.
#[must_use]
pub fn normalize_product_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Derive a product search key from an uploaded file name.
///
/// Only the final path component is considered (both `/` and `\` separators),
/// the extension is dropped and the rest is normalized. Returns `None` when
/// nothing usable is left.
///
/// ```
/// use shelfkeeper_core::product_name_from_filename;
///
/// assert_eq!(product_name_from_filename("../../Widget.JPG").as_deref(), Some("widget"));
/// assert_eq!(product_name_from_filename(".png"), None);
/// ```
#[must_use]
pub fn product_name_from_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = base
        .rfind('.')
        .and_then(|dot| base.get(..dot))
        .unwrap_or(base);
    let name = normalize_product_name(stem);
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_format() {
        let position = StoragePosition::new("3", "2", "left");
        assert_eq!(position.location(), "Coluna 3, Linha 2, left");
    }

    #[test]
    fn test_position_trims_components() {
        let position = StoragePosition::new(" A ", "1 ", " right");
        assert_eq!(position.location(), "Coluna A, Linha 1, right");
    }

    #[test]
    fn test_normalize_product_name() {
        assert_eq!(normalize_product_name("  WIDGET "), "widget");
        assert_eq!(normalize_product_name("Parafuso M6"), "parafuso m6");
        assert_eq!(normalize_product_name(""), "");
    }

    #[test]
    fn test_normalize_keeps_inner_whitespace() {
        assert_eq!(normalize_product_name(" Big  Box "), "big  box");
    }

    #[test]
    fn test_name_from_filename() {
        assert_eq!(
            product_name_from_filename("Widget.png").as_deref(),
            Some("widget")
        );
        assert_eq!(
            product_name_from_filename("C:\\fotos\\Parafuso.jpeg").as_deref(),
            Some("parafuso")
        );
        assert_eq!(
            product_name_from_filename("archive.tar.gz").as_deref(),
            Some("archive.tar")
        );
        assert_eq!(
            product_name_from_filename("no_extension").as_deref(),
            Some("no_extension")
        );
    }

    #[test]
    fn test_name_from_filename_rejects_empty() {
        assert_eq!(product_name_from_filename(""), None);
        assert_eq!(product_name_from_filename("dir/"), None);
        assert_eq!(product_name_from_filename(".png"), None);
        assert_eq!(product_name_from_filename("  .jpg"), None);
    }
}
