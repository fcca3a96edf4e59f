//! Core types for Shelfkeeper.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod position;
pub mod stock;

pub use email::{Email, EmailError};
pub use id::*;
pub use position::{StoragePosition, normalize_product_name, product_name_from_filename};
pub use stock::{LowStockThreshold, Price, Quantity, StockError};
