use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::{error::AppError, state::AppState, template};

/// Public storefront page: every product, newest first.
pub async fn index(State(state): State<AppState>) -> Response {
    let products = state.products.list().await;
    Html(template::listing(&products).into_string()).into_response()
}

/// Serve one stored image by filename, streamed from the upload directory.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let fs_path = state.uploads.resolve(&file).ok_or(AppError::NotFound)?;

    let file = tokio::fs::File::open(&fs_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound
        } else {
            AppError::Io(e)
        }
    })?;
    let content_length = file.metadata().await.map_err(AppError::Io)?.len();

    let mime: &'static str = mime_guess::from_path(&fs_path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Any unmatched route.
pub async fn fallback() -> AppError {
    AppError::NotFound
}
