mod handlers;
mod template;

use axum::{
    Form, Router,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::state::AppState;

/// Session cookie name.
const SESSION_COOKIE: &str = "sf_session";
/// Session lifetime (1 hour of inactivity, sliding).
const SESSION_TTL: Duration = Duration::from_secs(3600);

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the admin router with full `/adminF/*` paths.
/// Uses `merge` (not `nest`) in `main.rs` to avoid matchit's empty-catchall
/// gap which causes `/adminF/` to fall through to the fallback handler.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/adminF", get(get_root))
        .route("/adminF/login", post(post_login));

    let protected = Router::new()
        .route("/adminF/dashboard", get(handlers::get_dashboard))
        .route("/adminF/products", post(handlers::post_create_product))
        .route("/adminF/products/{id}", post(handlers::post_edit_product))
        .route(
            "/adminF/products/{id}/delete",
            post(handlers::post_delete_product),
        )
        .route("/adminF/password", post(handlers::post_change_password))
        .route("/adminF/logout", post(post_logout))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().merge(public).merge(protected)
}

// ── Auth middleware ───────────────────────────────────────────────────────────

async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if touch_session(&state, req.headers()).await {
        return next.run(req).await;
    }
    Redirect::to("/adminF").into_response()
}

/// Check the request's session cookie and, when valid, slide its expiry.
///
/// A single write lock covers both the validity check and the slide, so a
/// concurrent logout cannot sneak in between the read and the write.
async fn touch_session(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(token) = extract_session_cookie(headers) else {
        return false;
    };

    let mut sessions = state.sessions.write().await;
    if let Some(last_seen) = sessions.get(&token) {
        if last_seen.elapsed() < SESSION_TTL {
            sessions.insert(token, Instant::now());
            true
        } else {
            sessions.remove(&token);
            false
        }
    } else {
        false
    }
}

// ── Login / logout ────────────────────────────────────────────────────────────

/// `GET /adminF`: the login form, or straight to the dashboard when the
/// session is already authenticated.
async fn get_root(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if touch_session(&state, &headers).await {
        return Redirect::to("/adminF/dashboard").into_response();
    }
    Html(template::login_page(None).into_string()).into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    password: String,
}

async fn post_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.settings.verify(&form.password).await {
        // One admin identity only, so the message never distinguishes
        // "no such admin" from "wrong password".
        return Html(template::login_page(Some("Invalid password.")).into_string())
            .into_response();
    }

    let token = new_session_token();
    state
        .sessions
        .write()
        .await
        .insert(token.clone(), Instant::now());

    let cookie = format!(
        "{}={}; Path=/adminF; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    );
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/adminF/dashboard".to_string()),
        ],
    )
        .into_response()
}

async fn post_logout(State(state): State<AppState>, req: Request) -> Response {
    if let Some(token) = extract_session_cookie(req.headers()) {
        state.sessions.write().await.remove(&token);
    }
    let clear = format!(
        "{}=; Path=/adminF; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    );
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, clear),
            (header::LOCATION, "/adminF".to_string()),
        ],
    )
        .into_response()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_str.split(';') {
        let part = part.trim();
        if let Some(val) = part.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            return Some(val.to_string());
        }
    }
    None
}

fn new_session_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
