//! Product route handlers.
//!
//! All handlers require a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shelfkeeper_core::{LowStockThreshold, ProductId, StockError};

use super::MessageQuery;
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{LowStockItem, Product};
use crate::services::{AddProductInput, ImageError, InventoryError};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Low-stock query parameters. Kept as text so a bad value can be reported.
#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product list + add form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub email: String,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub email: String,
    pub product: Product,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/search.html")]
pub struct SearchTemplate {
    pub email: String,
    pub query: String,
    pub searched: bool,
    pub product: Option<Product>,
}

/// Low-stock report template.
#[derive(Template, WebTemplate)]
#[template(path = "products/low_stock.html")]
pub struct LowStockTemplate {
    pub email: String,
    pub threshold: i64,
    pub items: Vec<LowStockItem>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product list and the add form.
///
/// # Errors
///
/// Returns `AppError` if the products cannot be loaded.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<ProductsTemplate, AppError> {
    let products = state.inventory().list_products().await?;

    Ok(ProductsTemplate {
        email: user.email.to_string(),
        products,
        error: query.error_text(),
        success: query.success_text(),
    })
}

/// Handle the add-product form (multipart, optional `image` file).
///
/// # Errors
///
/// Returns `AppError` for storage failures. Bad input redirects back to the
/// list with an error code.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let input = match read_product_form(multipart).await {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read product form");
            return Ok(Redirect::to("/products?error=form").into_response());
        }
    };

    match state.inventory().add_product(input).await {
        Ok(id) => {
            add_breadcrumb("inventory", "Product added", &[("product_id", id.to_string())]);
            Ok(Redirect::to("/products?success=added").into_response())
        }
        Err(e) => match rejection_code(&e) {
            Some(code) => {
                tracing::info!(error = %e, "Product rejected");
                Ok(Redirect::to(&format!("/products?error={code}")).into_response())
            }
            None => Err(e.into()),
        },
    }
}

/// Display one product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no product has this ID.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<ProductTemplate, AppError> {
    let product = state
        .inventory()
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate {
        email: user.email.to_string(),
        product,
    })
}

/// Delete a product. Deleting a missing product still reports success.
///
/// # Errors
///
/// Returns `AppError` if the delete fails.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    state.inventory().delete_product(id).await?;
    add_breadcrumb("inventory", "Product deleted", &[("product_id", id.to_string())]);

    Ok(Redirect::to("/products?success=deleted"))
}

/// Search for a product by exact (case- and whitespace-insensitive) name.
///
/// # Errors
///
/// Returns `AppError` if the lookup fails.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate, AppError> {
    let query = query.q.unwrap_or_default();
    let searched = !query.trim().is_empty();

    let product = if searched {
        state.inventory().find_product(&query).await?
    } else {
        None
    };

    Ok(SearchTemplate {
        email: user.email.to_string(),
        query,
        searched,
        product,
    })
}

/// Low-stock report. An invalid `threshold` falls back to the default.
///
/// # Errors
///
/// Returns `AppError` if the query fails.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn low_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<LowStockQuery>,
) -> Result<LowStockTemplate, AppError> {
    let inventory = state.inventory();

    let (threshold, error) = match parse_threshold(query.threshold.as_deref()) {
        Ok(threshold) => (threshold.unwrap_or(inventory.default_threshold()), None),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid low-stock threshold");
            (
                inventory.default_threshold(),
                Some("Threshold must be a whole number of zero or more.".to_owned()),
            )
        }
    };

    let items = inventory.list_low_stock(Some(threshold)).await?;

    Ok(LowStockTemplate {
        email: user.email.to_string(),
        threshold: threshold.get(),
        items,
        error,
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Read the add-product form. Unknown fields are ignored.
async fn read_product_form(mut multipart: Multipart) -> Result<AddProductInput, MultipartError> {
    let mut input = AddProductInput::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    input.image = Some(bytes.to_vec());
                }
            }
            "name" => input.name = field.text().await?,
            "quantity" => input.quantity = field.text().await?,
            "price" => input.price = field.text().await?,
            "column" => input.column = field.text().await?,
            "row" => input.row = field.text().await?,
            "position" => input.position = field.text().await?,
            _ => {}
        }
    }

    Ok(input)
}

/// Redirect code for errors caused by the submitted form.
fn rejection_code(err: &InventoryError) -> Option<&'static str> {
    match err {
        InventoryError::EmptyName => Some("name"),
        InventoryError::Validation(
            StockError::InvalidQuantity(_) | StockError::NegativeQuantity,
        ) => Some("quantity"),
        InventoryError::Validation(StockError::InvalidPrice(_) | StockError::PriceOutOfRange) => {
            Some("price")
        }
        InventoryError::Validation(StockError::NegativeThreshold) => Some("form"),
        InventoryError::Image(ImageError::Decode(_)) => Some("image"),
        _ => None,
    }
}

/// Parse an optional `?threshold=` value; blank means "use the default".
fn parse_threshold(raw: Option<&str>) -> Result<Option<LowStockThreshold>, StockError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let value = raw
        .parse::<i64>()
        .map_err(|_| StockError::InvalidQuantity(raw.to_owned()))?;
    LowStockThreshold::new(value).map(Some)
}
