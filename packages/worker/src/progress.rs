//! Parsing of the render tool's progress output.

use std::sync::LazyLock;

use futures::stream::{self, Stream, StreamExt};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::warn;

static PROGRESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Fra:\s*(\d+).*?Time:\s*([0-9:.]+).*?Remaining:\s*([0-9:.]+)")
        .expect("progress pattern is valid")
});

/// Parse a duration of the form `[[hours:]minutes:]seconds[.fraction]` into seconds.
///
/// Returns `None` for empty input, more than three components, or any
/// component that is not a non-negative number.
pub fn parse_time_field(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut seconds = 0.0;
    let mut factor = 1.0;
    for part in parts.iter().rev() {
        let value: f64 = part.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        seconds += value * factor;
        factor *= 60.0;
    }
    Some(seconds)
}

/// One progress report for the frame being rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub frame: u32,
    /// Seconds spent on this frame.
    pub elapsed: f64,
    /// Seconds the render tool expects this frame still needs.
    pub remaining: f64,
    /// `elapsed / (elapsed + remaining) * 100`, or 0 when both are zero.
    pub percent: f64,
}

impl ProgressUpdate {
    pub fn new(frame: u32, elapsed: f64, remaining: f64) -> Self {
        let total = elapsed + remaining;
        let percent = if total > 0.0 {
            elapsed / total * 100.0
        } else {
            0.0
        };
        Self {
            frame,
            elapsed,
            remaining,
            percent,
        }
    }

    /// Extract a progress report from one line of render tool output.
    /// Lines that do not carry a frame number, elapsed and remaining time are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = PROGRESS_LINE.captures(line)?;
        let frame = caps[1].parse().ok()?;
        let elapsed = parse_time_field(&caps[2])?;
        let remaining = parse_time_field(&caps[3])?;
        Some(Self::new(frame, elapsed, remaining))
    }
}

/// Lazily read `reader` line by line. Invalid UTF-8 is replaced rather than
/// ending the stream; a read error ends it.
pub fn output_lines<R>(reader: R) -> impl Stream<Item = String> + Send + 'static
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(BufReader::new(reader), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                Some((line, reader))
            }
            Err(e) => {
                warn!(error = %e, "Failed to read render tool output");
                None
            }
        }
    })
}

/// Keep only the lines that carry progress.
pub fn progress_updates<S>(lines: S) -> impl Stream<Item = ProgressUpdate>
where
    S: Stream<Item = String>,
{
    lines.filter_map(|line| futures::future::ready(ProgressUpdate::parse(&line)))
}

/// Follows frame transitions in a stream of progress updates.
///
/// When the frame number changes, the previous frame is considered done and
/// is reported once at 100% regardless of the last percentage seen for it.
#[derive(Debug, Default)]
pub struct FrameTracker {
    current: Option<u32>,
    percent: f64,
    completed: u32,
}

impl FrameTracker {
    /// Record an update. Returns the frame that just finished, if the update
    /// moved on to a new frame.
    pub fn observe(&mut self, update: &ProgressUpdate) -> Option<u32> {
        let finished = match self.current {
            Some(previous) if previous != update.frame => {
                self.completed += 1;
                Some(previous)
            }
            _ => None,
        };
        self.current = Some(update.frame);
        self.percent = update.percent.clamp(0.0, 100.0);
        finished
    }

    /// Mark the frame in progress as finished. Called once the render tool exits cleanly.
    pub fn finish(&mut self) -> Option<u32> {
        let frame = self.current.take()?;
        self.percent = 100.0;
        self.completed += 1;
        Some(frame)
    }

    pub fn current_frame(&self) -> Option<u32> {
        self.current
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }
}
