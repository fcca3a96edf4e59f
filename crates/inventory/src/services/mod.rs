//! Business logic services for the inventory application.
//!
//! # Services
//!
//! - `auth` - Registration and password login (Argon2)
//! - `images` - Normalizes uploaded photos to inline base64 PNG
//! - `inventory` - Product operations behind the HTTP handlers and CLI
//! - `uploads` - On-disk storage for original upload bytes

pub mod auth;
pub mod images;
pub mod inventory;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use images::ImageError;
pub use inventory::{AddProductInput, InventoryError, InventoryService};
pub use uploads::{UploadError, UploadStore};
