//! Scene upload pipeline: dedup by declared checksum, stream to a temp file,
//! verify, then move into the scene store.

use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::scene::{ARCHIVE_EXTENSION, archive_file_name};
use common::upload::UploadMetadata;
use common::{Checksum, SceneMetadata};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// A new scene was stored under this id.
    Created(Uuid),
    /// A scene with the declared checksum already existed; nothing was stored.
    Existing(Uuid),
}

impl UploadOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            UploadOutcome::Created(id) | UploadOutcome::Existing(id) => *id,
        }
    }
}

fn has_archive_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Accept one scene upload. The `metadata` field must precede the `file`
/// field so a known checksum can be answered without reading the archive.
pub async fn accept_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadOutcome, AppError> {
    if state.engine.is_busy() {
        return Err(AppError::Busy("A render is in progress".into()));
    }
    let _permit = state
        .uploads
        .try_acquire()
        .ok_or_else(|| AppError::Busy("Another upload is in progress".into()))?;

    let mut declared: Option<Checksum> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("metadata") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read metadata: {e}")))?;
                let metadata: UploadMetadata = serde_json::from_str(&text)
                    .map_err(|e| AppError::Validation(format!("Invalid metadata: {e}")))?;

                if let Some(existing) = state.scenes.find_by_checksum(&metadata.checksum).await {
                    info!(id = %existing.id, checksum = %metadata.checksum, "Scene already stored");
                    return Ok(UploadOutcome::Existing(existing.id));
                }
                declared = Some(metadata.checksum);
            }
            Some("file") => {
                let checksum = declared.take().ok_or_else(|| {
                    AppError::Validation("The 'metadata' field must precede 'file'".into())
                })?;
                let original_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
                if !has_archive_extension(&original_name) {
                    return Err(AppError::Validation(format!(
                        "Scene must be a .{ARCHIVE_EXTENSION} archive"
                    )));
                }

                let id = Uuid::new_v4();
                store_scene(state, field, id, checksum, original_name).await?;
                return Ok(UploadOutcome::Created(id));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Err(AppError::Validation(if declared.is_some() {
        "Missing 'file' field".into()
    } else {
        "Missing 'metadata' field".into()
    }))
}

async fn store_scene(
    state: &AppState,
    field: Field<'_>,
    id: Uuid,
    declared: Checksum,
    original_name: String,
) -> Result<(), AppError> {
    let data = &state.config.data;
    let file_name = archive_file_name(id);
    let temp_path = data.temp_directory.join(&file_name);

    let result: Result<u64, AppError> = async {
        let size = stream_field_to_file(field, &temp_path, state.config.server.max_upload_size)
            .await?;

        let actual = Checksum::compute_file(&temp_path).await?;
        if actual != declared {
            warn!(%id, %declared, %actual, size, "Upload checksum mismatch");
            return Err(AppError::ChecksumMismatch(format!(
                "Declared checksum {declared} does not match uploaded content"
            )));
        }

        fs::rename(&temp_path, data.scenes_directory.join(&file_name))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to move scene into place: {e}")))?;
        Ok(size)
    }
    .await;

    let size = match result {
        Ok(size) => size,
        Err(e) => {
            // Best effort.
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    state
        .scenes
        .add_scene(SceneMetadata::new(id, declared, original_name))
        .await;
    info!(%id, checksum = %declared, size, "Scene stored");
    Ok(())
}

/// Write a multipart field to `path`, refusing more than `max_size` bytes.
async fn stream_field_to_file(
    mut field: Field<'_>,
    path: &Path,
    max_size: u64,
) -> Result<u64, AppError> {
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    let mut total_size: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        total_size += chunk.len() as u64;
        if total_size > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
    Ok(total_size)
}
