//! Medicine identification endpoint
//!
//! `POST /identify/` accepts `multipart/form-data` with one or more parts
//! named `files`. The response body is either `{"medicine": {...}}` or, when
//! no image produced a usable identification, the flat compatibility body
//! `{"error": "Failed to identify medicine from provided images"}` (HTTP 200).

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use medid_common::ConsolidatedResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::{IdentifyError, UploadedImage};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying uploaded images
pub const FILES_FIELD: &str = "files";

/// Identification response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifyResponse {
    Medicine(ConsolidatedResult),
    Error(String),
}

/// POST /identify/
///
/// **Errors:**
/// - 400 Bad Request: no `files` parts, empty or non-image file, malformed multipart
/// - 413 Payload Too Large: body exceeds `max_upload_bytes`
/// - 502 Bad Gateway: the external identifier could not be reached
pub async fn identify_medicine(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<IdentifyResponse>> {
    let images = read_images(multipart).await?;

    match state.identification.identify_batch(&images).await {
        Ok(consolidated) => Ok(Json(IdentifyResponse::Medicine(consolidated))),
        Err(IdentifyError::NoUsableInput) => Ok(Json(IdentifyResponse::Error(
            IdentifyError::NoUsableInput.to_string(),
        ))),
        Err(err @ IdentifyError::Upstream { .. }) => {
            let message = err.to_string();
            state.record_error(message.clone()).await;
            Err(ApiError::Upstream(message))
        }
    }
}

async fn read_images(mut multipart: Multipart) -> ApiResult<Vec<UploadedImage>> {
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", images.len() + 1));
        let data = field.bytes().await?;

        let image = UploadedImage::new(file_name, data.to_vec()).map_err(|e| {
            warn!("Rejected upload: {}", e);
            ApiError::BadRequest(e.to_string())
        })?;
        images.push(image);
    }

    if images.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "No images provided; upload one or more files in the '{}' field",
            FILES_FIELD
        )));
    }

    Ok(images)
}

/// Build identification routes
pub fn identify_routes() -> Router<AppState> {
    Router::new()
        .route("/identify/", post(identify_medicine))
        .route("/identify", post(identify_medicine))
}
