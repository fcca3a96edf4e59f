//! Authentication route handlers.
//!
//! One page carries both the login and the registration form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::MessageQuery;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login and registration form data.
#[derive(Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login + register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page, or skip it when already logged in.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    LoginTemplate {
        error: query.error_text(),
        success: query.success_text(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// # Errors
///
/// Returns `AppError` if the user lookup or the session store fails.
#[instrument(skip(state, session, form), fields(email = %form.email.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let Some(user) = state.auth().authenticate(&form.email, &form.password).await? else {
        tracing::info!("Login rejected");
        return Ok(Redirect::to("/auth/login?error=credentials").into_response());
    };

    if let Err(e) = set_current_user(&session, &CurrentUser::from(&user)).await {
        tracing::error!(error = %e, "Failed to set session");
        return Ok(Redirect::to("/auth/login?error=session").into_response());
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Redirect::to("/dashboard").into_response())
}

/// Handle registration form submission.
///
/// # Errors
///
/// Returns `AppError` for database or hashing failures.
#[instrument(skip(state, form), fields(email = %form.email.trim()))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let code = match state.auth().register(&form.email, &form.password).await {
        Ok(_) => return Ok(Redirect::to("/auth/login?success=registered").into_response()),
        Err(AuthError::DuplicateEmail) => "email_taken",
        Err(AuthError::InvalidEmail(_)) => "invalid_email",
        Err(AuthError::EmptyPassword) => "empty_password",
        Err(e) => return Err(e.into()),
    };

    tracing::info!(reason = code, "Registration rejected");
    Ok(Redirect::to(&format!("/auth/login?error={code}")).into_response())
}

/// Handle logout.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to("/auth/login?success=logged_out")
}
