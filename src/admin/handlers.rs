use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    settings::PasswordError,
    state::AppState,
};

use super::template;

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// One-shot feedback carried across the post/redirect/get cycle.
#[derive(Deserialize, Default)]
pub struct Flash {
    pub msg: Option<String>,
    pub err: Option<String>,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let products = state.products.list().await;
    Html(
        template::dashboard(&products, flash.msg.as_deref(), flash.err.as_deref())
            .into_string(),
    )
    .into_response()
}

// ── Product create / edit / delete ────────────────────────────────────────────

pub async fn post_create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_product_form(multipart).await?;

    let image_path = match &form.image {
        Some((name, data)) => Some(state.uploads.save(name, data).await?),
        None => None,
    };
    state.products.add(&form.description, image_path).await?;

    Ok(see_dashboard(Feedback::Msg("Product added.")))
}

pub async fn post_edit_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_product_form(multipart).await?;

    // Store the new image before touching the record; the stale file is
    // deleted only after the rewrite lands. The two steps are never atomic:
    // a crash in between leaves an orphaned file, not a broken catalog.
    let new_image = match &form.image {
        Some((name, data)) => Some(state.uploads.save(name, data).await?),
        None => None,
    };

    match state
        .products
        .update(&id, &form.description, new_image.clone())
        .await?
    {
        Some(updated) => {
            if let Some(stale) = &updated.stale_image {
                state.uploads.remove(stale).await;
            }
            Ok(see_dashboard(Feedback::Msg("Product updated.")))
        }
        None => {
            // Unknown id: don't leave the just-written upload orphaned.
            if let Some(path) = &new_image {
                state.uploads.remove(path).await;
            }
            Err(AppError::NotFound)
        }
    }
}

pub async fn post_delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    match state.products.remove(&id).await? {
        Some(product) => {
            if let Some(image) = &product.image_path {
                state.uploads.remove(image).await;
            }
            Ok(see_dashboard(Feedback::Msg("Product deleted.")))
        }
        None => Err(AppError::NotFound),
    }
}

// ── Password rotation ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PasswordForm {
    #[serde(rename = "newPassword")]
    new_password: String,
}

pub async fn post_change_password(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Result<Response, AppError> {
    match state.settings.set_password(&form.new_password).await {
        Ok(()) => Ok(see_dashboard(Feedback::Msg("Password updated."))),
        Err(e @ PasswordError::TooShort) => {
            Ok(see_dashboard(Feedback::Err(&e.to_string())))
        }
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

// ── Multipart form ────────────────────────────────────────────────────────────

/// Fields shared by the create and edit forms. The image is `None` unless a
/// real file arrived (a file input left empty submits an empty part).
struct ProductForm {
    description: String,
    image: Option<(String, Bytes)>,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm {
        description: String::new(),
        image: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("description") => {
                form.description = field.text().await.map_err(bad_multipart)?;
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                if !file_name.is_empty() && !data.is_empty() {
                    form.image = Some((file_name, data));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed form submission: {e}"))
}

// ── Redirect helpers ──────────────────────────────────────────────────────────

enum Feedback<'a> {
    Msg(&'a str),
    Err(&'a str),
}

fn see_dashboard(feedback: Feedback<'_>) -> Response {
    let url = match feedback {
        Feedback::Msg(m) => format!("/adminF/dashboard?msg={}", urlencoded(m)),
        Feedback::Err(e) => format!("/adminF/dashboard?err={}", urlencoded(e)),
    };
    Redirect::to(&url).into_response()
}

/// Percent-encode a flash message for safe use in a query string.
fn urlencoded(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, percent_encoding::NON_ALPHANUMERIC).to_string()
}
