//! Landing page and dashboard handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct IndexTemplate;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "home/dashboard.html")]
pub struct DashboardTemplate {
    pub email: String,
    pub product_count: usize,
    pub low_stock_count: usize,
    pub threshold: i64,
}

/// Landing page; logged-in users go straight to the dashboard.
pub async fn index(OptionalAuth(user): OptionalAuth) -> Response {
    match user {
        Some(_) => Redirect::to("/dashboard").into_response(),
        None => IndexTemplate.into_response(),
    }
}

/// Dashboard with stock totals.
///
/// # Errors
///
/// Returns `AppError` if the product queries fail.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<DashboardTemplate, AppError> {
    let inventory = state.inventory();
    let products = inventory.list_products().await?;
    let low_stock = inventory.list_low_stock(None).await?;

    Ok(DashboardTemplate {
        email: user.email.to_string(),
        product_count: products.len(),
        low_stock_count: low_stock.len(),
        threshold: inventory.default_threshold().get(),
    })
}
