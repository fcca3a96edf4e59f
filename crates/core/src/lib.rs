//! Shelfkeeper Core - Shared domain types.
//!
//! This crate provides the types used across all Shelfkeeper components:
//! - `inventory` - The web application (auth, product catalog, uploads)
//! - `cli` - Command-line tools for migrations, users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding for the newtypes is available behind the
//! `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, stock values and storage positions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
