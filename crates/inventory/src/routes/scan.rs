//! Scan-by-photo handlers.
//!
//! Staff photograph a shelf item and name the file after the product. Only
//! the file name is used, as a lookup key; the photo itself is not stored.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use shelfkeeper_core::product_name_from_filename;

use super::MessageQuery;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Scan form template.
#[derive(Template, WebTemplate)]
#[template(path = "scan.html")]
pub struct ScanTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Display the scan form.
pub async fn scan_page(
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> ScanTemplate {
    ScanTemplate {
        email: user.email.to_string(),
        error: query.error_text(),
    }
}

/// Look up the product named by the uploaded file and show it.
///
/// # Errors
///
/// Returns `AppError` if the lookup fails.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn scan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file_name = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read scan form");
                return Ok(Redirect::to("/scan?error=form").into_response());
            }
        };

        if field.name() == Some("image") {
            file_name = field.file_name().map(str::to_owned);
        }
    }

    let Some(name) = file_name.as_deref().and_then(product_name_from_filename) else {
        return Ok(Redirect::to("/scan?error=no_file").into_response());
    };

    match state.inventory().find_product(&name).await? {
        Some(product) => {
            tracing::info!(product_id = %product.id, "Scan matched product");
            Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
        }
        None => {
            tracing::info!(name = %name, "Scan matched nothing");
            Ok(Redirect::to("/scan?error=not_found").into_response())
        }
    }
}
