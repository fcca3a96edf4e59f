//! HTTP route handlers for the inventory app.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page (redirects to dashboard when logged in)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Auth
//! GET  /auth/login                - Login and registration page
//! POST /auth/login                - Login action
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # Inventory (requires auth)
//! GET  /dashboard                 - Overview
//! GET  /products                  - Product list and add form
//! POST /products                  - Add product (multipart, optional `image`)
//! GET  /products/search?q=        - Exact name lookup
//! GET  /products/low-stock        - Low-stock report (`?threshold=`)
//! GET  /products/{id}             - Product detail
//! POST /products/{id}/delete      - Delete product
//! GET  /scan                      - Scan-by-photo form
//! POST /scan                      - Look up a product by photo file name
//! ```
//!
//! Handlers report outcomes to the next page as `?error=<code>` or
//! `?success=<code>`; [`MessageQuery`] turns codes back into text.

pub mod auth;
pub mod health;
pub mod home;
pub mod products;
pub mod scan;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Create the auth routes router (nested under `/auth`).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router (nested under `/products`).
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/search", get(products::search))
        .route("/low-stock", get(products::low_stock))
        .route("/{id}", get(products::show))
        .route("/{id}/delete", post(products::delete))
}

/// Create all page routes except `/auth`.
///
/// `/auth` is nested separately so the caller can rate-limit it.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/dashboard", get(home::dashboard))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .route("/scan", get(scan::scan_page).post(scan::scan))
}

// =============================================================================
// Flash Messages
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Human-readable error text for the `error` code, if any.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.error.as_deref().map(|code| error_text(code).to_owned())
    }

    /// Human-readable success text for the `success` code, if any.
    #[must_use]
    pub fn success_text(&self) -> Option<String> {
        self.success.as_deref().map(|code| success_text(code).to_owned())
    }
}

fn error_text(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "email_taken" => "An account with this email already exists.",
        "invalid_email" => "Please enter a valid email address.",
        "empty_password" => "Password cannot be empty.",
        "session" => "Could not start your session. Please try again.",
        "name" => "Product name cannot be empty.",
        "quantity" => "Quantity must be a whole number of zero or more.",
        "price" => "Price must be a number of zero or more.",
        "image" => "The photo could not be read as an image.",
        "form" => "The form could not be read. Please try again.",
        "no_file" => "Choose a photo to scan.",
        "not_found" => "No product matches that name.",
        _ => "Something went wrong. Please try again.",
    }
}

fn success_text(code: &str) -> &'static str {
    match code {
        "registered" => "Account created. You can log in now.",
        "logged_out" => "You have been logged out.",
        "added" => "Product added.",
        "deleted" => "Product deleted.",
        _ => "Done.",
    }
}
