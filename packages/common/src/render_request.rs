use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Body of a render start request as sent by the client.
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation error instead of a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RenderRequest {
    /// Identifier of a stored scene.
    pub id: Option<Uuid>,
    /// First frame to render (inclusive).
    #[schema(example = 1)]
    pub frame_start: Option<u16>,
    /// Last frame to render (inclusive).
    #[schema(example = 250)]
    pub frame_end: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderRequestError {
    #[error("Render request is missing '{0}'")]
    MissingField(&'static str),

    #[error("frame_start ({start}) must not be greater than frame_end ({end})")]
    InvertedRange { start: u16, end: u16 },
}

impl RenderRequest {
    pub fn new(id: Uuid, frame_start: u16, frame_end: u16) -> Self {
        Self {
            id: Some(id),
            frame_start: Some(frame_start),
            frame_end: Some(frame_end),
        }
    }

    pub fn validate(&self) -> Result<RenderSpec, RenderRequestError> {
        let id = self.id.ok_or(RenderRequestError::MissingField("id"))?;
        let frame_start = self
            .frame_start
            .ok_or(RenderRequestError::MissingField("frame_start"))?;
        let frame_end = self
            .frame_end
            .ok_or(RenderRequestError::MissingField("frame_end"))?;

        if frame_start > frame_end {
            return Err(RenderRequestError::InvertedRange {
                start: frame_start,
                end: frame_end,
            });
        }

        Ok(RenderSpec {
            id,
            frame_start,
            frame_end,
        })
    }
}

/// A validated render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RenderSpec {
    pub id: Uuid,
    pub frame_start: u16,
    pub frame_end: u16,
}

impl RenderSpec {
    /// Number of frames in the inclusive range.
    pub fn frame_count(&self) -> u32 {
        u32::from(self.frame_end) - u32::from(self.frame_start) + 1
    }
}

/// Body of a result fetch request.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultRequest {
    pub id: Uuid,
}
