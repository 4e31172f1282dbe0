use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checksum::Checksum;
use crate::scene::SceneMetadata;

/// JSON carried in the `metadata` multipart field of an upload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadMetadata {
    /// Hex-encoded SHA-256 of the archive being uploaded.
    #[schema(value_type = String, example = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")]
    pub checksum: Checksum,
}

/// Returned when an upload is accepted or deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
}

/// Public view of a stored scene.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SceneSummary {
    pub id: Uuid,
    pub original_name: String,
    /// Nanoseconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SceneListResponse {
    pub scenes: Vec<SceneSummary>,
}

impl From<&SceneMetadata> for SceneSummary {
    fn from(scene: &SceneMetadata) -> Self {
        Self {
            id: scene.id,
            original_name: scene.original_name.clone(),
            created_at: scene.created_at,
        }
    }
}

impl From<&[SceneMetadata]> for SceneListResponse {
    fn from(scenes: &[SceneMetadata]) -> Self {
        Self {
            scenes: scenes.iter().map(SceneSummary::from).collect(),
        }
    }
}
