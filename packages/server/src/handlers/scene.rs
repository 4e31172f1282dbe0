use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use common::upload::{SceneListResponse, UploadResponse};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::upload::{UploadOutcome, accept_upload};

/// Body limit for scene uploads, with headroom for the metadata field and multipart framing.
pub fn upload_body_limit(max_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(64 * 1024))
}

#[utoipa::path(
    post,
    path = "/scenes",
    tag = "Scenes",
    operation_id = "uploadScene",
    summary = "Upload a scene archive",
    description = "Multipart upload with a `metadata` field (JSON `{\"checksum\": \"<sha256 hex>\"}`) \
        followed by a `file` field holding a `.zip` scene archive. If a scene with the declared \
        checksum is already stored its id is returned and the archive is not read. The stored \
        bytes must hash to the declared checksum.",
    request_body(content_type = "multipart/form-data", description = "Scene metadata and archive"),
    responses(
        (status = 201, description = "Scene stored", body = UploadResponse),
        (status = 200, description = "Scene with this checksum already stored", body = UploadResponse),
        (status = 400, description = "Invalid upload (VALIDATION_ERROR, CHECKSUM_MISMATCH)", body = ErrorBody),
        (status = 503, description = "Another upload or a render is in progress (SERVICE_BUSY)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_scene(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let outcome = accept_upload(&state, multipart).await?;
    let status = match outcome {
        UploadOutcome::Created(_) => StatusCode::CREATED,
        UploadOutcome::Existing(_) => StatusCode::OK,
    };
    Ok((status, Json(UploadResponse { id: outcome.id() })))
}

#[utoipa::path(
    get,
    path = "/scenes",
    tag = "Scenes",
    operation_id = "listScenes",
    summary = "List stored scenes",
    description = "Returns every stored scene in upload order.",
    responses(
        (status = 200, description = "Scene list", body = SceneListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_scenes(State(state): State<AppState>) -> Json<SceneListResponse> {
    let scenes = state.scenes.scenes().await;
    Json(SceneListResponse::from(scenes.as_slice()))
}
