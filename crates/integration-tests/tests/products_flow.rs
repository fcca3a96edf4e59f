//! Product management, search, low-stock and scan through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use image::ImageFormat;
use shelfkeeper_integration_tests::{MultipartForm, TestApp, sample_image, widget_form};

async fn logged_in_app() -> TestApp {
    let mut app = TestApp::new().await;
    app.register_and_login("clerk@example.com", "s3cret").await;
    app
}

async fn add(app: &mut TestApp, name: &str, quantity: &str, price: &str) {
    let form = MultipartForm::new()
        .text("name", name)
        .text("quantity", quantity)
        .text("price", price)
        .text("column", "B")
        .text("row", "2")
        .text("position", "right");
    let response = app.post_multipart("/products", form).await;
    assert!(
        response.redirects_to("/products?success=added"),
        "{name}: {response:?}"
    );
}

async fn product_id(app: &TestApp, name: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM products WHERE name = ?")
        .bind(name)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    id
}

async fn product_count(app: &TestApp) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_add_product_without_photo() {
    let mut app = logged_in_app().await;

    let response = app.post_multipart("/products", widget_form()).await;
    assert!(response.redirects_to("/products?success=added"), "{response:?}");

    let list = app.get("/products?success=added").await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.body.contains("Product added."));
    assert!(list.body.contains("Widget"));
    assert!(list.body.contains("9.99"));
    assert!(list.body.contains("Coluna A, Linha 1, left"));

    assert_eq!(app.upload_count(), 0);

    let (image_data, column, level): (String, Option<String>, Option<String>) = sqlx::query_as(
        "SELECT image_data, CAST(stored_column AS TEXT), CAST(stored_level AS TEXT) \
         FROM products WHERE name = 'Widget'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(image_data, "");
    assert_eq!(column.as_deref(), Some("A"));
    assert_eq!(level.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_add_product_with_photo() {
    let mut app = logged_in_app().await;

    let jpeg = sample_image(ImageFormat::Jpeg);
    let form = widget_form().file("image", "widget.jpg", "image/jpeg", &jpeg);
    let response = app.post_multipart("/products", form).await;
    assert!(response.redirects_to("/products?success=added"), "{response:?}");

    // The original upload is kept on disk and a PNG copy is stored inline.
    assert_eq!(app.upload_count(), 1);

    let id = product_id(&app, "Widget").await;
    let page = app.get(&format!("/products/{id}")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data:image/png;base64,iVBORw0KGgo"));
    assert!(page.body.contains("Coluna A, Linha 1, left"));

    // The detail page links the original, which is served back unchanged.
    let start = page.body.find("href=\"/uploads/").unwrap() + "href=\"".len();
    let end = start + page.body[start..].find('"').unwrap();
    let original_url = page.body[start..end].to_owned();
    assert!(original_url.ends_with(".jpg"), "{original_url}");

    let original = app.get(&original_url).await;
    assert_eq!(original.status, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_photo_is_rejected_without_side_effects() {
    let mut app = logged_in_app().await;

    let form = widget_form().file("image", "widget.png", "image/png", b"not really a png");
    let response = app.post_multipart("/products", form).await;
    assert!(response.redirects_to("/products?error=image"), "{response:?}");

    assert_eq!(product_count(&app).await, 0);
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_invalid_fields_are_rejected() {
    let mut app = logged_in_app().await;

    let cases = [
        (widget_form().text("quantity", "-1"), "quantity"),
        (widget_form().text("quantity", "ten"), "quantity"),
        (widget_form().text("price", "abc"), "price"),
        (widget_form().text("name", "   "), "name"),
    ];

    for (form, code) in cases {
        let response = app.post_multipart("/products", form).await;
        let expected = format!("/products?error={code}");
        assert!(response.redirects_to(&expected), "{code}: {response:?}");
    }

    assert_eq!(product_count(&app).await, 0);
}

#[tokio::test]
async fn test_search_is_exact_and_case_insensitive() {
    let mut app = logged_in_app().await;
    app.post_multipart("/products", widget_form()).await;

    for query in ["Widget", "widget", "%20WIDGET%20"] {
        let page = app.get(&format!("/products/search?q={query}")).await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Coluna A, Linha 1, left"), "{query}");
        assert!(!page.body.contains("Product not found."), "{query}");
    }

    let partial = app.get("/products/search?q=Widg").await;
    assert!(partial.body.contains("Product not found."));

    let blank = app.get("/products/search").await;
    assert_eq!(blank.status, StatusCode::OK);
    assert!(!blank.body.contains("Product not found."));
}

#[tokio::test]
async fn test_low_stock_report() {
    let mut app = logged_in_app().await;
    add(&mut app, "Widget", "10", "9.99").await;
    add(&mut app, "Bolt", "1", "0.50").await;
    add(&mut app, "Nut", "2", "0.25").await;

    let report = app.get("/products/low-stock").await;
    assert_eq!(report.status, StatusCode::OK);
    assert!(report.body.contains("Bolt"));
    assert!(report.body.contains("Nut"));
    assert!(!report.body.contains("Widget"));

    let strict = app.get("/products/low-stock?threshold=1").await;
    assert!(strict.body.contains("Bolt"));
    assert!(!strict.body.contains("Nut"));

    let none = app.get("/products/low-stock?threshold=0").await;
    assert!(none.body.contains("Nothing at or below 0 units."));

    let invalid = app.get("/products/low-stock?threshold=lots").await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert!(invalid.body.contains("Threshold must be a whole number of zero or more."));
    assert!(invalid.body.contains("Nut"));
}

#[tokio::test]
async fn test_dashboard_counts() {
    let mut app = logged_in_app().await;
    add(&mut app, "Widget", "10", "9.99").await;
    add(&mut app, "Bolt", "0", "0.50").await;

    let dashboard = app.get("/dashboard").await;
    assert!(dashboard.body.contains("2 products"));
    assert!(dashboard.body.contains("1 at or below 2 units"));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mut app = logged_in_app().await;
    app.post_multipart("/products", widget_form()).await;
    let id = product_id(&app, "Widget").await;

    let first = app.post_form(&format!("/products/{id}/delete"), &[]).await;
    assert!(first.redirects_to("/products?success=deleted"));
    assert_eq!(product_count(&app).await, 0);

    let again = app.post_form(&format!("/products/{id}/delete"), &[]).await;
    assert!(again.redirects_to("/products?success=deleted"));

    let missing = app.get(&format!("/products/{id}")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_finds_product_by_file_name() {
    let mut app = logged_in_app().await;
    app.post_multipart("/products", widget_form()).await;
    let id = product_id(&app, "Widget").await;

    let photo = sample_image(ImageFormat::Png);
    let form = MultipartForm::new().file("image", "WIDGET.png", "image/png", &photo);
    let response = app.post_multipart("/scan", form).await;
    assert!(response.redirects_to(&format!("/products/{id}")), "{response:?}");

    // Scanning never stores the photo.
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_scan_reports_unknown_and_missing_files() {
    let mut app = logged_in_app().await;
    app.post_multipart("/products", widget_form()).await;

    let photo = sample_image(ImageFormat::Png);
    let unknown = MultipartForm::new().file("image", "gadget.png", "image/png", &photo);
    let response = app.post_multipart("/scan", unknown).await;
    assert!(response.redirects_to("/scan?error=not_found"), "{response:?}");

    let empty = MultipartForm::new().file("image", "", "application/octet-stream", b"");
    let response = app.post_multipart("/scan", empty).await;
    assert!(response.redirects_to("/scan?error=no_file"), "{response:?}");

    let page = app.get("/scan?error=not_found").await;
    assert!(page.body.contains("No product matches that name."));
}
