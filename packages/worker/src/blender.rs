use std::path::Path;
use std::process::{ExitStatus, Stdio};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::progress::output_lines;

/// Arguments for one headless render of an inclusive frame range.
#[derive(Debug, Clone)]
pub struct RenderCommand<'a> {
    pub program: &'a str,
    pub scene_file: &'a Path,
    pub output_dir: &'a Path,
    pub frame_pattern: &'a str,
    pub frame_start: u16,
    pub frame_end: u16,
}

impl RenderCommand<'_> {
    /// `<program> -b <scene> -s <start> -e <end> -o <output dir>/<pattern> -a`
    pub fn args(&self) -> Vec<String> {
        vec![
            "-b".into(),
            self.scene_file.to_string_lossy().into_owned(),
            "-s".into(),
            self.frame_start.to_string(),
            "-e".into(),
            self.frame_end.to_string(),
            "-o".into(),
            self.output_dir
                .join(self.frame_pattern)
                .to_string_lossy()
                .into_owned(),
            "-a".into(),
        ]
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.program);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

/// A running render tool with its stdout and stderr merged into one line stream.
pub struct RenderProcess {
    child: Child,
    output: Option<BoxStream<'static, String>>,
}

impl RenderProcess {
    pub fn spawn(command: &RenderCommand<'_>) -> Result<Self> {
        debug!(program = command.program, args = ?command.args(), "Starting render tool");
        let mut child = command.command().spawn().map_err(RenderError::Spawn)?;

        let stdout = child.stdout.take().map(output_lines);
        let stderr = child.stderr.take().map(output_lines);
        let output = match (stdout, stderr) {
            (Some(out), Some(err)) => stream::select(out, err).boxed(),
            (Some(out), None) => out.boxed(),
            (None, Some(err)) => err.boxed(),
            (None, None) => stream::empty().boxed(),
        };

        Ok(Self {
            child,
            output: Some(output),
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take the merged output. Dropping it closes both pipes.
    pub fn take_output(&mut self) -> BoxStream<'static, String> {
        self.output.take().unwrap_or_else(|| stream::empty().boxed())
    }

    pub async fn wait(mut self) -> std::io::Result<ExitStatus> {
        self.output.take();
        self.child.wait().await
    }
}
