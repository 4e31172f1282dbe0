use std::path::Path;
use std::sync::Arc;

use common::daemon::{CommitBody, DaemonEnvelope, DaemonReply, DaemonRequestType};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::storage::DaemonStorage;

/// Longest request line read from a connection.
const MAX_REQUEST_BYTES: u64 = 64 * 1024;

/// Bind `path`, removing a socket file left behind by a previous run.
pub fn bind(path: &Path) -> Result<UnixListener> {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed stale socket"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(UnixListener::bind(path)?)
}

/// Accept connections until the listener fails. Each connection carries one
/// JSON envelope and receives one JSON reply, both newline terminated.
pub async fn serve(listener: UnixListener, storage: Arc<DaemonStorage>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let storage = storage.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &storage).await {
                        warn!(error = %e, "Connection failed");
                    }
                });
            }
            Err(e) => error!(error = %e, "Could not accept incoming connection"),
        }
    }
}

async fn handle_connection(stream: UnixStream, storage: &DaemonStorage) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut line = String::new();
    BufReader::new(read.take(MAX_REQUEST_BYTES))
        .read_line(&mut line)
        .await?;

    let reply = match serde_json::from_str::<DaemonEnvelope>(&line) {
        Ok(envelope) => handle(&envelope, storage),
        Err(e) => {
            warn!(error = %e, "Could not decode request");
            DaemonReply::Error {
                message: format!("Malformed request: {e}"),
            }
        }
    };

    let mut out = serde_json::to_vec(&reply)?;
    out.push(b'\n');
    write.write_all(&out).await?;
    write.shutdown().await?;
    Ok(())
}

pub fn handle(envelope: &DaemonEnvelope, storage: &DaemonStorage) -> DaemonReply {
    match envelope.request_type {
        DaemonRequestType::Status => DaemonReply::Ok {
            nodes: storage.nodes.clone(),
        },
        DaemonRequestType::Commit => {
            let body: CommitBody = match envelope.parse_body() {
                Ok(body) => body,
                Err(e) => {
                    return DaemonReply::Error {
                        message: format!("Malformed commit body: {e}"),
                    };
                }
            };
            if body.files.is_empty() {
                return DaemonReply::Error {
                    message: "Commit carries no files".into(),
                };
            }
            if body.frame_start > body.frame_end {
                return DaemonReply::Error {
                    message: format!(
                        "frame_start ({}) must not be greater than frame_end ({})",
                        body.frame_start, body.frame_end
                    ),
                };
            }
            info!(
                files = body.files.len(),
                frame_start = body.frame_start,
                frame_end = body.frame_end,
                nodes = storage.nodes.len(),
                "Commit received"
            );
            DaemonReply::Error {
                message: "Distributed rendering is not implemented".into(),
            }
        }
    }
}
