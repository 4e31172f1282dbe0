use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::{RenderProgress, RenderSpec, SceneMetadata, StatusResponse};
use uuid::Uuid;

use crate::progress::ProgressUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Extracting the scene and starting the render tool.
    Preparing,
    Rendering,
    /// Packaging frames into the result archive.
    Collecting,
}

/// Everything known about the render in flight.
#[derive(Debug, Clone)]
pub struct RendererState {
    pub scene: SceneMetadata,
    pub request: RenderSpec,
    pub phase: JobPhase,
    pub current_frame: u32,
    pub frame_percent: f64,
    pub time_elapsed: f64,
    pub time_remaining: f64,
}

impl RendererState {
    pub fn new(scene: SceneMetadata, request: RenderSpec) -> Self {
        Self {
            scene,
            request,
            phase: JobPhase::Preparing,
            current_frame: 0,
            frame_percent: 0.0,
            time_elapsed: 0.0,
            time_remaining: 0.0,
        }
    }

    pub fn apply(&mut self, update: &ProgressUpdate) {
        self.current_frame = update.frame;
        self.frame_percent = update.percent;
        self.time_elapsed = update.elapsed;
        self.time_remaining = update.remaining;
    }

    pub fn to_status(&self) -> StatusResponse {
        StatusResponse::rendering(
            self.request,
            RenderProgress {
                current_frame: self.current_frame,
                frame_percent: self.frame_percent,
                frame_count: self.request.frame_count(),
                time_elapsed: self.time_elapsed,
                time_remaining: self.time_remaining,
            },
        )
    }
}

/// Shared slot holding the state of the render in flight, if any.
///
/// Readers and the render task only ever hold the inner lock for a copy or a
/// field update, so status queries never wait on a running render.
#[derive(Debug, Clone, Default)]
pub struct JobSlot(Arc<RwLock<Option<RendererState>>>);

impl JobSlot {
    fn read(&self) -> RwLockReadGuard<'_, Option<RendererState>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<RendererState>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> StatusResponse {
        self.read()
            .as_ref()
            .map(RendererState::to_status)
            .unwrap_or_else(StatusResponse::idle)
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<RendererState> {
        self.read().clone()
    }

    pub fn is_active(&self) -> bool {
        self.read().is_some()
    }

    /// Publish `state` and return a guard that clears the slot when dropped.
    pub fn begin(&self, state: RendererState) -> ActiveJob {
        let id = state.request.id;
        *self.write() = Some(state);
        ActiveJob {
            slot: self.clone(),
            id,
        }
    }
}

/// Ownership of the published render state. Dropping it returns the node to idle.
#[derive(Debug)]
pub struct ActiveJob {
    slot: JobSlot,
    id: Uuid,
}

impl ActiveJob {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn apply(&self, update: &ProgressUpdate) {
        if let Some(state) = self.slot.write().as_mut() {
            state.apply(update);
        }
    }

    pub fn set_phase(&self, phase: JobPhase) {
        if let Some(state) = self.slot.write().as_mut() {
            state.phase = phase;
        }
    }
}

impl Drop for ActiveJob {
    fn drop(&mut self) {
        self.slot.write().take();
    }
}
