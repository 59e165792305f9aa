//! HTTP surface
//!
//! Two routes: the upload form and the scan endpoint. Each request owns its
//! image for the full processing cycle; the pipeline itself is shared
//! immutably.

pub mod view;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ScanError;
use crate::vision::ScanPipeline;

/// Shared request-handling state.
pub struct AppState {
    pub pipeline: ScanPipeline,
}

/// Build the application router.
pub fn router(state: Arc<AppState>, max_upload_mb: u64) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scan", post(scan))
        .layer(DefaultBodyLimit::max((max_upload_mb * 1024 * 1024) as usize))
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(view::upload_page())
}

/// Handle one uploaded image: decode, annotate, render the result page.
///
/// Every failure surfaces as an error page with a kind-specific message;
/// nothing here panics on malformed input.
async fn scan(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    match process_upload(&state, multipart).await {
        Ok(html) => (StatusCode::OK, Html(html)),
        Err(err) => {
            warn!("scan request failed: {}", err);
            let status = match err {
                ScanError::UnreadableImage(_) | ScanError::DecodeFailure(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ScanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Html(view::error_page(&err.user_message())))
        }
    }
}

async fn process_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<String, ScanError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::UnreadableImage(e.to_string()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ScanError::UnreadableImage(e.to_string()))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .ok_or_else(|| ScanError::UnreadableImage("no image field in upload".to_string()))?;
    info!("received upload of {} bytes", bytes.len());

    let image = image::load_from_memory(&bytes)?;
    let outcome = state.pipeline.process(image)?;
    info!("scan found {} QR code(s)", outcome.detections);

    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(outcome.image)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ScanError::Internal(anyhow::anyhow!("PNG encoding failed: {e}")))?;

    Ok(view::result_page(&BASE64.encode(&png), &outcome.text))
}
