//! Domain models for the inventory application.
//!
//! These are validated domain objects, separate from the database row types
//! kept private to each repository.

pub mod product;
pub mod session;
pub mod user;

pub use product::{LowStockItem, NewProduct, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
