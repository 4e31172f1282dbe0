use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::config::DataConfig;
use common::scene::archive_file_name;
use common::{RenderRequest, SceneStore, StatusResponse};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::archive;
use crate::blender::{RenderCommand, RenderProcess};
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::gate::{FlightPermit, SingleFlight};
use crate::progress::{FrameTracker, progress_updates};
use crate::state::{ActiveJob, JobPhase, JobSlot, RendererState};
use crate::workspace::{self, Workspace};

/// Runs at most one render at a time and publishes its progress.
pub struct RenderEngine {
    data: DataConfig,
    render: RenderConfig,
    scenes: Arc<SceneStore>,
    gate: SingleFlight,
    slot: JobSlot,
}

impl RenderEngine {
    pub fn new(data: DataConfig, render: RenderConfig, scenes: Arc<SceneStore>) -> Self {
        Self {
            data,
            render,
            scenes,
            gate: SingleFlight::new("render"),
            slot: JobSlot::default(),
        }
    }

    /// Held from admission of a render until its background task has cleaned up.
    pub fn gate(&self) -> &SingleFlight {
        &self.gate
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn status(&self) -> StatusResponse {
        self.slot.status()
    }

    /// Where the result archive of scene `id` is written.
    pub fn result_path(&self, id: Uuid) -> PathBuf {
        self.data.output_directory.join(archive_file_name(id))
    }

    /// Admit a render, prepare its workspace and launch the render tool.
    ///
    /// Returns once the tool is running; the rest of the job continues on the
    /// returned task. On error the node is left idle.
    #[instrument(skip(self, request), fields(id = ?request.id))]
    pub async fn start(&self, request: &RenderRequest) -> Result<JoinHandle<()>> {
        let permit = self.gate.try_acquire().ok_or(RenderError::Busy)?;
        let spec = request.validate()?;
        let scene = self
            .scenes
            .find_by_id(spec.id)
            .await
            .ok_or(RenderError::SceneNotFound(spec.id))?;

        let archive_path = self.data.scenes_directory.join(&scene.filename);
        let job = self.slot.begin(RendererState::new(scene, spec));
        info!(
            frame_start = spec.frame_start,
            frame_end = spec.frame_end,
            "Render admitted"
        );

        let workspace =
            Workspace::prepare(&self.data.workspace_directory, spec.id, &archive_path).await?;
        debug!(workspace = %workspace.path().display(), "Scene extracted");
        let scene_file = workspace
            .find_scene_file(&self.render.scene_extension)
            .await?;
        let output_dir =
            workspace::create_output_dir(&scene_file, &self.render.output_dir_name).await?;

        let process = RenderProcess::spawn(&RenderCommand {
            program: &self.render.blender,
            scene_file: &scene_file,
            output_dir: &output_dir,
            frame_pattern: &self.render.frame_pattern,
            frame_start: spec.frame_start,
            frame_end: spec.frame_end,
        })?;
        info!(pid = ?process.id(), scene = %scene_file.display(), "Render tool started");
        job.set_phase(JobPhase::Rendering);

        let task = RenderTask {
            job,
            workspace,
            output_dir,
            result_path: self.result_path(spec.id),
            _permit: permit,
        };
        Ok(tokio::spawn(task.run(process)))
    }
}

/// Background half of a render. Field order matters: the published state is
/// cleared before the render gate is released.
struct RenderTask {
    job: ActiveJob,
    workspace: Workspace,
    output_dir: PathBuf,
    result_path: PathBuf,
    _permit: FlightPermit,
}

impl RenderTask {
    async fn run(self, mut process: RenderProcess) {
        let id = self.job.id();
        let mut tracker = FrameTracker::default();

        let mut updates = progress_updates(process.take_output());
        while let Some(update) = updates.next().await {
            if let Some(frame) = tracker.observe(&update) {
                info!(%id, frame, percent = 100.0, "Frame rendered");
            }
            debug!(
                %id,
                frame = update.frame,
                percent = update.percent,
                remaining = update.remaining,
                "Render progress"
            );
            self.job.apply(&update);
        }
        drop(updates);

        match process.wait().await {
            Ok(status) if status.success() => {}
            Ok(status) => {
                error!(%id, %status, "Render tool exited with failure");
                return;
            }
            Err(e) => {
                error!(%id, error = %e, "Failed to wait for render tool");
                return;
            }
        }
        if let Some(frame) = tracker.finish() {
            info!(%id, frame, percent = 100.0, "Frame rendered");
        }

        self.job.set_phase(JobPhase::Collecting);
        match collect(&self.output_dir, &self.result_path).await {
            Ok(files) => info!(
                %id,
                frames = tracker.completed(),
                files,
                result = %self.result_path.display(),
                "Render finished"
            ),
            Err(e) => error!(%id, error = %e, "Failed to package render output"),
        }

        let RenderTask { job, workspace, _permit, .. } = self;
        if let Err(e) = workspace.remove().await {
            warn!(%id, error = %e, "Failed to remove workspace");
        }
        drop(job);
        drop(_permit);
    }
}

async fn collect(output_dir: &Path, result_path: &Path) -> Result<usize> {
    let src = output_dir.to_path_buf();
    let dest = result_path.to_path_buf();
    tokio::task::spawn_blocking(move || archive::compress_dir(&src, &dest)).await?
}
