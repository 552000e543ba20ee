use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{auth::middleware::IdentityUser, error::AppError, state::AppState};

/// Image upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploadimages", post(upload_image))
        .route("/removeimage", post(remove_image))
}

#[derive(Debug, Deserialize)]
struct UploadRequest {
    #[serde(default)]
    image: String,
}

#[derive(Debug, Deserialize)]
struct RemoveRequest {
    #[serde(default)]
    public_id: String,
}

#[derive(Debug, Serialize)]
struct Removed {
    success: bool,
}

/// `POST /api/uploadimages` — push a base64 data URI to the image host.
async fn upload_image(
    State(state): State<AppState>,
    IdentityUser(claims): IdentityUser,
    Json(req): Json<UploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.image.trim().is_empty() {
        return Err(AppError::BadRequest("image is required".to_string()));
    }

    let public_id = chrono::Utc::now().timestamp_millis().to_string();
    let uploaded = state
        .images
        .upload(&req.image, &public_id)
        .await
        .map_err(AppError::BadGateway)?;

    tracing::info!(public_id = %uploaded.public_id, uid = %claims.sub, "Image uploaded");
    Ok(Json(uploaded))
}

/// `POST /api/removeimage` — reports failure in the body instead of erroring.
async fn remove_image(
    State(state): State<AppState>,
    IdentityUser(_claims): IdentityUser,
    Json(req): Json<RemoveRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.public_id.trim().is_empty() {
        return Err(AppError::BadRequest("public_id is required".to_string()));
    }

    let success = match state.images.destroy(req.public_id.trim()).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(public_id = %req.public_id, "Image removal failed: {e:#}");
            false
        }
    };

    Ok(Json(Removed { success }))
}
