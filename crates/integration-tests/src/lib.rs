//! Integration test harness for Shelfkeeper.
//!
//! [`TestApp`] builds the real router over an in-memory `SQLite` store, an
//! in-memory session store and a temporary upload directory, then drives it
//! with `tower::ServiceExt::oneshot`. The session cookie is carried between
//! requests like a browser would.
//!
//! ```rust,ignore
//! let mut app = TestApp::new().await;
//! app.register_and_login("clerk@example.com", "s3cret").await;
//! let page = app.get("/products").await;
//! assert_eq!(page.status, StatusCode::OK);
//! ```

use std::io::Cursor;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use shelfkeeper_core::LowStockThreshold;
use shelfkeeper_inventory::config::InventoryConfig;
use shelfkeeper_inventory::db;
use shelfkeeper_inventory::middleware::SESSION_COOKIE_NAME;
use shelfkeeper_inventory::state::AppState;

/// A running application plus a cookie jar holding one session.
pub struct TestApp {
    router: Router,
    pub pool: SqlitePool,
    upload_dir: tempfile::TempDir,
    session_cookie: Option<String>,
}

/// What a request returned.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Whether this is a redirect to `path`.
    #[must_use]
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status.is_redirection() && self.location.as_deref() == Some(path)
    }
}

impl TestApp {
    /// Build a fresh application with an empty, migrated store.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store or temp directory cannot be created.
    pub async fn new() -> Self {
        let pool = db::create_in_memory_pool()
            .await
            .expect("in-memory pool");
        db::ensure_schema(&pool).await.expect("schema");
        let upload_dir = tempfile::tempdir().expect("temp upload dir");

        let state = AppState::new(test_config(upload_dir.path()), pool.clone());
        let router = shelfkeeper_inventory::app(state, MemoryStore::default(), None);

        Self {
            router,
            pool,
            upload_dir,
            session_cookie: None,
        }
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Number of files in the upload directory.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).map_or(0, Iterator::count)
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).expect("request");
        self.send(request).await
    }

    /// Send a POST with an url-encoded form body.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Send a POST with a multipart body.
    pub async fn post_multipart(&mut self, uri: &str, form: MultipartForm) -> TestResponse {
        let (content_type, body) = form.finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Register an account and log in with it.
    ///
    /// # Panics
    ///
    /// Panics if either step does not end in the expected redirect.
    pub async fn register_and_login(&mut self, email: &str, password: &str) {
        let registered = self
            .post_form("/auth/register", &[("email", email), ("password", password)])
            .await;
        assert!(
            registered.redirects_to("/auth/login?success=registered"),
            "register: {registered:?}"
        );

        let login = self
            .post_form("/auth/login", &[("email", email), ("password", password)])
            .await;
        assert!(login.redirects_to("/dashboard"), "login: {login:?}");
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            self.store_cookie(value);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let Some((name, value)) = pair.split_once('=') else {
            return;
        };
        if name != SESSION_COOKIE_NAME {
            return;
        }

        let expired = set_cookie.contains("Max-Age=0");
        self.session_cookie = (!value.is_empty() && !expired).then(|| pair.to_owned());
    }
}

/// Configuration pointing at a temporary upload directory.
#[must_use]
pub fn test_config(upload_dir: &Path) -> InventoryConfig {
    InventoryConfig {
        database_url: SecretString::from("sqlite::memory:".to_owned()),
        host: [127, 0, 0, 1].into(),
        port: 5000,
        base_url: "http://localhost:5000".to_owned(),
        upload_dir: upload_dir.to_path_buf(),
        low_stock_threshold: LowStockThreshold::DEFAULT,
        max_upload_bytes: 10 * 1024 * 1024,
        trust_proxy_headers: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Builder for `multipart/form-data` request bodies.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Start an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: format!("shelfkeeper-{}", uuid::Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Encode a small solid-colour image in `format`.
///
/// # Panics
///
/// Panics if the `image` crate cannot encode the format.
#[must_use]
pub fn sample_image(format: image::ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        8,
        8,
        image::Rgb([20, 120, 200]),
    ));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode sample image");
    bytes
}

/// The add-product form for the canonical Widget example.
#[must_use]
pub fn widget_form() -> MultipartForm {
    MultipartForm::new()
        .text("name", "Widget")
        .text("quantity", "10")
        .text("price", "9.99")
        .text("column", "A")
        .text("row", "1")
        .text("position", "left")
}
