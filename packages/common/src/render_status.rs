use serde::{Deserialize, Serialize};

use crate::render_request::RenderSpec;

/// Live progress of the frame currently being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RenderProgress {
    pub current_frame: u32,
    /// Completion of the current frame, 0-100.
    #[schema(example = 42.5)]
    pub frame_percent: f64,
    /// Total frames in the requested range.
    pub frame_count: u32,
    /// Seconds spent on the current frame.
    pub time_elapsed: f64,
    /// Seconds the render tool expects the current frame still needs.
    pub time_remaining: f64,
}

/// Status document returned by the status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub is_rendering: bool,
    pub request: Option<RenderSpec>,
    pub progress: Option<RenderProgress>,
}

impl StatusResponse {
    pub fn idle() -> Self {
        Self {
            is_rendering: false,
            request: None,
            progress: None,
        }
    }

    pub fn rendering(request: RenderSpec, progress: RenderProgress) -> Self {
        Self {
            is_rendering: true,
            request: Some(request),
            progress: Some(progress),
        }
    }
}
