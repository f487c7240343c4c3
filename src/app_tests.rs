//! Whole-application tests: the real router driven in-memory, backed by a
//! throwaway data directory.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use crate::products::ProductStore;
use crate::settings::SettingsStore;
use crate::state::AppState;
use crate::upload::UploadStore;

const PASSWORD: &str = "opensesame";
const BOUNDARY: &str = "sf-test-boundary";

async fn test_app() -> (tempfile::TempDir, AppState, Router) {
    let dir = tempfile::tempdir().expect("temp dir");

    let products = ProductStore::new(dir.path());
    let settings = SettingsStore::new(dir.path());
    let uploads = UploadStore::new(dir.path());
    tokio::fs::create_dir_all(uploads.dir())
        .await
        .expect("uploads dir");
    settings
        .seed_if_missing(Some(PASSWORD))
        .await
        .expect("seed");

    let state = AppState::new(products, settings, uploads);
    let app = crate::app(state.clone());
    (dir, state, app)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn multipart_post(uri: &str, body: Vec<u8>, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .expect("request")
}

fn multipart_body(description: Option<&str>, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(desc) = description {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"description\"\r\n\r\n{desc}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                 name=\"image\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn login(app: &Router, password: &str) -> String {
    let resp = app
        .clone()
        .oneshot(form_post(
            "/adminF/login",
            &format!("password={password}"),
            None,
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    resp.headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("ascii cookie")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

// ── Public pages ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_is_open() {
    let (_dir, _state, app) = test_app().await;
    let resp = app.oneshot(get("/healthz", None)).await.expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_get_a_404_page() {
    let (_dir, _state, app) = test_app().await;
    let resp = app
        .oneshot(get("/no/such/page", None))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_shows_products_newest_first() {
    let (_dir, state, app) = test_app().await;
    state.products.add("Red Mug", None).await.expect("add");
    state.products.add("Blue Cup", None).await.expect("add");

    let resp = app.oneshot(get("/", None)).await.expect("request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_string(resp).await;
    let blue = body.find("Blue Cup").expect("Blue Cup rendered");
    let red = body.find("Red Mug").expect("Red Mug rendered");
    assert!(blue < red, "newest product must render first");
}

#[tokio::test]
async fn upload_serving_rejects_unknown_files() {
    let (_dir, _state, app) = test_app().await;
    let resp = app
        .oneshot(get("/uploads/absent.png", None))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Authentication ────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_redirect_anonymous_sessions_to_login() {
    let (_dir, _state, app) = test_app().await;

    for (method, uri) in [
        ("GET", "/adminF/dashboard"),
        ("POST", "/adminF/products"),
        ("POST", "/adminF/products/some-id"),
        ("POST", "/adminF/products/some-id/delete"),
        ("POST", "/adminF/password"),
        ("POST", "/adminF/logout"),
    ] {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let resp = app.clone().oneshot(req).await.expect("request");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{method} {uri}");
        assert_eq!(location(&resp), "/adminF", "{method} {uri}");
    }
}

#[tokio::test]
async fn login_page_is_reachable_without_a_session() {
    let (_dir, _state, app) = test_app().await;
    let resp = app.oneshot(get("/adminF", None)).await.expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Sign in"));
}

#[tokio::test]
async fn wrong_password_rerenders_login_with_a_generic_error() {
    let (_dir, _state, app) = test_app().await;
    let resp = app
        .oneshot(form_post("/adminF/login", "password=nope", None))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Invalid password."));
}

#[tokio::test]
async fn login_grants_dashboard_access_until_logout() {
    let (_dir, _state, app) = test_app().await;
    let cookie = login(&app, PASSWORD).await;

    // Authenticated sessions skip the login form entirely.
    let resp = app
        .clone()
        .oneshot(get("/adminF", Some(&cookie)))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/adminF/dashboard");

    let resp = app
        .clone()
        .oneshot(get("/adminF/dashboard", Some(&cookie)))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Add a product"));

    let resp = app
        .clone()
        .oneshot(form_post("/adminF/logout", "", Some(&cookie)))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // The old cookie no longer opens the dashboard.
    let resp = app
        .oneshot(get("/adminF/dashboard", Some(&cookie)))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/adminF");
}

// ── Product CRUD over HTTP ────────────────────────────────────────────────────

#[tokio::test]
async fn create_edit_delete_product_without_image() {
    let (_dir, state, app) = test_app().await;
    let cookie = login(&app, PASSWORD).await;

    let resp = app
        .clone()
        .oneshot(multipart_post(
            "/adminF/products",
            multipart_body(Some("Red Mug"), None),
            &cookie,
        ))
        .await
        .expect("create");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/adminF/dashboard?msg="));

    let products = state.products.list().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].description, "Red Mug");
    assert_eq!(products[0].image_path, None);
    let id = products[0].id.clone();

    // Blank description on edit keeps the old text.
    let resp = app
        .clone()
        .oneshot(multipart_post(
            &format!("/adminF/products/{id}"),
            multipart_body(Some("   "), None),
            &cookie,
        ))
        .await
        .expect("edit");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.products.list().await[0].description, "Red Mug");

    let resp = app
        .clone()
        .oneshot(multipart_post(
            &format!("/adminF/products/{id}"),
            multipart_body(Some("Red Mug, large"), None),
            &cookie,
        ))
        .await
        .expect("edit");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.products.list().await[0].description, "Red Mug, large");

    let resp = app
        .clone()
        .oneshot(multipart_post(
            &format!("/adminF/products/{id}/delete"),
            multipart_body(None, None),
            &cookie,
        ))
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.products.list().await.is_empty());
}

#[tokio::test]
async fn editing_an_unknown_product_is_a_404() {
    let (_dir, _state, app) = test_app().await;
    let cookie = login(&app, PASSWORD).await;

    let resp = app
        .oneshot(multipart_post(
            "/adminF/products/no-such-id",
            multipart_body(Some("anything"), None),
            &cookie,
        ))
        .await
        .expect("edit");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_lifecycle_create_replace_delete() {
    let (_dir, state, app) = test_app().await;
    let cookie = login(&app, PASSWORD).await;

    let resp = app
        .clone()
        .oneshot(multipart_post(
            "/adminF/products",
            multipart_body(Some("Teapot"), Some(("teapot.png", b"png-one"))),
            &cookie,
        ))
        .await
        .expect("create");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let product = state.products.list().await.remove(0);
    let first_url = product.image_path.clone().expect("image stored");
    let first_file = first_url.strip_prefix("/uploads/").expect("prefix");
    let first_path = state.uploads.resolve(first_file).expect("safe name");
    assert!(first_path.exists());

    // The stored image is served back on the public side.
    let resp = app
        .clone()
        .oneshot(get(&first_url, None))
        .await
        .expect("serve");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        to_bytes(resp.into_body(), usize::MAX).await.expect("body"),
        b"png-one".as_slice()
    );

    // Replacing the image removes the old file from disk.
    let resp = app
        .clone()
        .oneshot(multipart_post(
            &format!("/adminF/products/{}", product.id),
            multipart_body(None, Some(("teapot2.png", b"png-two"))),
            &cookie,
        ))
        .await
        .expect("edit");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let replaced = state.products.list().await.remove(0);
    let second_url = replaced.image_path.expect("image kept");
    assert_ne!(second_url, first_url);
    assert!(!first_path.exists(), "stale image must be cleaned up");

    // Deleting the product removes its image too.
    let second_file = second_url.strip_prefix("/uploads/").expect("prefix");
    let second_path = state.uploads.resolve(second_file).expect("safe name");
    assert!(second_path.exists());

    let resp = app
        .clone()
        .oneshot(multipart_post(
            &format!("/adminF/products/{}/delete", product.id),
            multipart_body(None, None),
            &cookie,
        ))
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(!second_path.exists());
    assert!(state.products.list().await.is_empty());
}

// ── Password rotation over HTTP ───────────────────────────────────────────────

#[tokio::test]
async fn password_rotation_enforces_the_minimum_length() {
    let (_dir, state, app) = test_app().await;
    let cookie = login(&app, PASSWORD).await;

    let resp = app
        .clone()
        .oneshot(form_post(
            "/adminF/password",
            "newPassword=short",
            Some(&cookie),
        ))
        .await
        .expect("rotate");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/adminF/dashboard?err="));
    assert!(state.settings.verify(PASSWORD).await, "password unchanged");

    let resp = app
        .clone()
        .oneshot(form_post(
            "/adminF/password",
            "newPassword=longenough",
            Some(&cookie),
        ))
        .await
        .expect("rotate");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/adminF/dashboard?msg="));

    // Old password out, new password in.
    let resp = app
        .clone()
        .oneshot(form_post(
            "/adminF/login",
            &format!("password={PASSWORD}"),
            None,
        ))
        .await
        .expect("login");
    assert_eq!(resp.status(), StatusCode::OK);

    login(&app, "longenough").await;
}
