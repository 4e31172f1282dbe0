use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::scene::archive_file_name;
use common::{RenderRequest, ResultRequest, StatusResponse};
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::AppJson;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/render",
    tag = "Render",
    operation_id = "startRender",
    summary = "Start rendering a stored scene",
    description = "Renders the inclusive frame range of a stored scene in the background. \
        Returns as soon as the render tool is running; poll the status endpoint for progress. \
        Only one render runs at a time.",
    request_body = RenderRequest,
    responses(
        (status = 202, description = "Render started", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown scene (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "A render is already in progress (SERVICE_BUSY)", body = ErrorBody),
        (status = 500, description = "Workspace or render tool failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, request), fields(id = ?request.id))]
pub async fn start_render(
    State(state): State<AppState>,
    AppJson(request): AppJson<RenderRequest>,
) -> Result<impl IntoResponse, AppError> {
    // The task owns the render gate; it is not awaited here.
    let _task = state.engine.start(&request).await?;
    info!("Render accepted");
    Ok((StatusCode::ACCEPTED, "Render started"))
}

#[utoipa::path(
    get,
    path = "/render/status",
    tag = "Render",
    operation_id = "renderStatus",
    summary = "Current render status",
    responses(
        (status = 200, description = "Idle or live progress of the running render", body = StatusResponse),
    ),
)]
pub async fn render_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.engine.status())
}

#[utoipa::path(
    post,
    path = "/render/result",
    tag = "Render",
    operation_id = "renderResult",
    summary = "Download a render result",
    description = "Streams the result archive of the last successful render of the scene.",
    request_body = ResultRequest,
    responses(
        (status = 200, description = "Result archive (application/zip)"),
        (status = 400, description = "Invalid body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No result for this scene (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, request), fields(id = %request.id))]
pub async fn render_result(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResultRequest>,
) -> Result<Response, AppError> {
    let path = state.engine.result_path(request.id);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "No render result for scene {}",
                request.id
            )));
        }
        Err(e) => return Err(AppError::Internal(format!("Failed to open result: {e}"))),
    };
    let size = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat result: {e}")))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive_file_name(request.id)),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
