//! Registration, login and logout through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use shelfkeeper_integration_tests::TestApp;

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new().await;

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut app = TestApp::new().await;

    for path in [
        "/dashboard",
        "/products",
        "/products/search?q=widget",
        "/products/low-stock",
        "/products/1",
        "/scan",
    ] {
        let response = app.get(path).await;
        assert!(response.redirects_to("/auth/login"), "{path}: {response:?}");
    }
}

#[tokio::test]
async fn test_landing_page_is_public() {
    let mut app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_login_and_logout() {
    let mut app = TestApp::new().await;
    app.register_and_login("clerk@example.com", "s3cret").await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("clerk@example.com"));

    // Logged-in users skip the landing and login pages.
    assert!(app.get("/").await.redirects_to("/dashboard"));
    assert!(app.get("/auth/login").await.redirects_to("/dashboard"));

    let logout = app.post_form("/auth/logout", &[]).await;
    assert!(logout.redirects_to("/auth/login?success=logged_out"));

    assert!(app.get("/dashboard").await.redirects_to("/auth/login"));
}

#[tokio::test]
async fn test_login_with_normalized_email() {
    let mut app = TestApp::new().await;
    app.register_and_login("Clerk@Example.com", "s3cret").await;
    app.post_form("/auth/logout", &[]).await;

    let login = app
        .post_form(
            "/auth/login",
            &[("email", "  clerk@example.COM "), ("password", "s3cret")],
        )
        .await;
    assert!(login.redirects_to("/dashboard"), "{login:?}");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let mut app = TestApp::new().await;

    let first = app
        .post_form(
            "/auth/register",
            &[("email", "clerk@example.com"), ("password", "one")],
        )
        .await;
    assert!(first.redirects_to("/auth/login?success=registered"));

    let second = app
        .post_form(
            "/auth/register",
            &[("email", "CLERK@example.com"), ("password", "two")],
        )
        .await;
    assert!(second.redirects_to("/auth/login?error=email_taken"), "{second:?}");

    // The original password still works.
    let login = app
        .post_form(
            "/auth/login",
            &[("email", "clerk@example.com"), ("password", "one")],
        )
        .await;
    assert!(login.redirects_to("/dashboard"));
}

#[tokio::test]
async fn test_registration_input_errors() {
    let mut app = TestApp::new().await;

    let bad_email = app
        .post_form(
            "/auth/register",
            &[("email", "not-an-email"), ("password", "pw")],
        )
        .await;
    assert!(bad_email.redirects_to("/auth/login?error=invalid_email"));

    let empty_password = app
        .post_form(
            "/auth/register",
            &[("email", "clerk@example.com"), ("password", "")],
        )
        .await;
    assert!(empty_password.redirects_to("/auth/login?error=empty_password"));
}

#[tokio::test]
async fn test_bad_credentials_do_not_log_in() {
    let mut app = TestApp::new().await;
    app.post_form(
        "/auth/register",
        &[("email", "clerk@example.com"), ("password", "right")],
    )
    .await;

    for (email, password) in [
        ("clerk@example.com", "wrong"),
        ("nobody@example.com", "right"),
        ("garbage", "right"),
    ] {
        let response = app
            .post_form("/auth/login", &[("email", email), ("password", password)])
            .await;
        assert!(
            response.redirects_to("/auth/login?error=credentials"),
            "{email}: {response:?}"
        );
    }

    assert!(app.get("/dashboard").await.redirects_to("/auth/login"));

    let page = app.get("/auth/login?error=credentials").await;
    assert!(page.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let mut app = TestApp::new().await;
    app.register_and_login("clerk@example.com", "plain-text").await;

    let (hash,): (String,) = sqlx::query_as("SELECT password FROM users WHERE email = ?")
        .bind("clerk@example.com")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(hash, "plain-text");
    assert!(hash.starts_with("$argon2"));
}
