//! Stock values: quantities, prices and the low-stock threshold.
//!
//! Form input arrives as text; these types are the single place where it is
//! turned into values the `products` table can store.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised when a quantity or price cannot be stored.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// The quantity is not a whole number.
    #[error("quantity must be a whole number, got '{0}'")]
    InvalidQuantity(String),
    /// The quantity is below zero.
    #[error("quantity cannot be negative")]
    NegativeQuantity,
    /// The price is not a number.
    #[error("price must be a number, got '{0}'")]
    InvalidPrice(String),
    /// The price is negative, infinite or NaN.
    #[error("price must be a finite, non-negative amount")]
    PriceOutOfRange,
    /// The low-stock threshold is below zero.
    #[error("low-stock threshold cannot be negative")]
    NegativeThreshold,
}

/// Number of units on the shelf. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    /// Create a quantity from an integer.
    ///
    /// # Errors
    ///
    /// Returns `StockError::NegativeQuantity` if `value < 0`.
    pub const fn new(value: i64) -> Result<Self, StockError> {
        if value < 0 {
            return Err(StockError::NegativeQuantity);
        }
        Ok(Self(value))
    }

    /// Parse a quantity from form text.
    ///
    /// # Errors
    ///
    /// Returns `StockError::InvalidQuantity` if the text is not an integer and
    /// `StockError::NegativeQuantity` if it is below zero.
    pub fn parse(s: &str) -> Result<Self, StockError> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| StockError::InvalidQuantity(trimmed.to_owned()))?;
        Self::new(value)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit price. Stored as `REAL`, so it stays a float.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Create a price from a float.
    ///
    /// # Errors
    ///
    /// Returns `StockError::PriceOutOfRange` for negative, infinite or NaN values.
    pub fn new(value: f64) -> Result<Self, StockError> {
        if !value.is_finite() || value < 0.0 {
            return Err(StockError::PriceOutOfRange);
        }
        Ok(Self(value))
    }

    /// Parse a price from form text.
    ///
    /// Accepts either `.` or a single `,` as the decimal separator, since
    /// warehouse staff type prices both ways.
    ///
    /// # Errors
    ///
    /// Returns `StockError::InvalidPrice` if the text is not a number and
    /// `StockError::PriceOutOfRange` if the number cannot be a price.
    pub fn parse(s: &str) -> Result<Self, StockError> {
        let trimmed = s.trim();
        let normalized = if trimmed.contains('.') {
            trimmed.to_owned()
        } else {
            trimmed.replacen(',', ".", 1)
        };
        let value = normalized
            .parse::<f64>()
            .map_err(|_| StockError::InvalidPrice(trimmed.to_owned()))?;
        Self::new(value)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = StockError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Quantity at or below which a product counts as low stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LowStockThreshold(i64);

impl LowStockThreshold {
    /// The threshold used when none is configured.
    pub const DEFAULT: Self = Self(2);

    /// Create a threshold.
    ///
    /// # Errors
    ///
    /// Returns `StockError::NegativeThreshold` if `value < 0`.
    pub const fn new(value: i64) -> Result<Self, StockError> {
        if value < 0 {
            return Err(StockError::NegativeThreshold);
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for LowStockThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for LowStockThreshold {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LowStockThreshold> for i64 {
    fn from(threshold: LowStockThreshold) -> Self {
        threshold.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_parse() {
        assert_eq!(Quantity::parse("10").unwrap().get(), 10);
        assert_eq!(Quantity::parse(" 0 ").unwrap().get(), 0);
    }

    #[test]
    fn test_quantity_rejects_garbage() {
        assert_eq!(
            Quantity::parse("ten"),
            Err(StockError::InvalidQuantity("ten".to_owned()))
        );
        assert!(matches!(
            Quantity::parse("1.5"),
            Err(StockError::InvalidQuantity(_))
        ));
        assert_eq!(Quantity::parse("-1"), Err(StockError::NegativeQuantity));
    }

    #[test]
    fn test_price_parse() {
        assert!((Price::parse("9.99").unwrap().get() - 9.99).abs() < f64::EPSILON);
        assert!((Price::parse("9,99").unwrap().get() - 9.99).abs() < f64::EPSILON);
        assert!((Price::parse("12").unwrap().get() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert!(matches!(
            Price::parse("cheap"),
            Err(StockError::InvalidPrice(_))
        ));
        assert!(matches!(
            Price::parse("1,000.50"),
            Err(StockError::InvalidPrice(_))
        ));
        assert_eq!(Price::parse("-3"), Err(StockError::PriceOutOfRange));
        assert_eq!(Price::parse("inf"), Err(StockError::PriceOutOfRange));
        assert_eq!(Price::parse("NaN"), Err(StockError::PriceOutOfRange));
    }

    #[test]
    fn test_price_display_has_two_decimals() {
        assert_eq!(Price::new(3.5).unwrap().to_string(), "3.50");
    }

    #[test]
    fn test_threshold_default_is_two() {
        assert_eq!(LowStockThreshold::default().get(), 2);
    }

    #[test]
    fn test_threshold_rejects_negative() {
        assert_eq!(
            LowStockThreshold::new(-1),
            Err(StockError::NegativeThreshold)
        );
    }

    #[test]
    fn test_quantity_serde_validates() {
        let parsed: Result<Quantity, _> = serde_json::from_str("-4");
        assert!(parsed.is_err());
        let parsed: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(parsed.get(), 4);
    }
}
