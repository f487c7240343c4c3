mod admin;
mod error;
mod handler;
mod products;
mod settings;
mod state;
mod template;
mod upload;

#[cfg(test)]
mod app_tests;

use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit, http::StatusCode, routing::get};
use clap::Parser;
use products::ProductStore;
use settings::SettingsStore;
use state::AppState;
use std::path::PathBuf;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use upload::UploadStore;

/// Largest accepted request body; bounds image uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "shopfront", about = "A small storefront with a password-protected admin area")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory holding products.json, config.json and uploads/.
    /// Defaults to a `data` directory adjacent to the server binary.
    #[arg(long, env = "DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// Initial admin password; read only when no config file exists yet.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present (silently ignored if absent).
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let data_root = match args.data_root {
        Some(path) => path,
        None => {
            let exe = std::env::current_exe().context("Cannot determine binary path")?;
            exe.parent()
                .context("Binary has no parent directory")?
                .join("data")
        }
    };

    tracing::info!("data root: {}", data_root.display());

    let products = ProductStore::new(&data_root);
    let settings = SettingsStore::new(&data_root);
    let uploads = UploadStore::new(&data_root);

    tokio::fs::create_dir_all(uploads.dir())
        .await
        .with_context(|| format!("Cannot create {}", uploads.dir().display()))?;

    if settings
        .seed_if_missing(args.admin_password.as_deref())
        .await
        .context("Cannot initialize admin config")?
    {
        tracing::info!("admin config initialized from the provided initial password");
    }

    let state = AppState::new(products, settings, uploads);
    let app = app(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Assemble the full router. Split out of `main` so tests can drive the
/// application without binding a socket.
fn app(state: AppState) -> Router {
    // CatchPanicLayer is outermost so it recovers from panics anywhere in
    // the stack.
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .route("/", get(handler::index))
        .route("/uploads/{file}", get(handler::serve_upload))
        .merge(admin::router(state.clone()))
        .fallback(handler::fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result { tracing::error!("ctrl-c error: {}", e); }
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    tracing::info!("Shutting down gracefully");
}
