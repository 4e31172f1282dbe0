//! Envelopes exchanged with the coordination daemon over its Unix socket.

use std::net::IpAddr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Discriminates the body carried by a [`DaemonEnvelope`]. Encoded as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DaemonRequestType {
    /// Report daemon status and known nodes.
    Status,
    /// Distribute tracked files and a frame range to the known nodes.
    Commit,
}

impl TryFrom<u8> for DaemonRequestType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Status),
            1 => Ok(Self::Commit),
            other => Err(format!("unknown daemon request type: {other}")),
        }
    }
}

impl From<DaemonRequestType> for u8 {
    fn from(value: DaemonRequestType) -> Self {
        match value {
            DaemonRequestType::Status => 0,
            DaemonRequestType::Commit => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonEnvelope {
    #[serde(rename = "type")]
    pub request_type: DaemonRequestType,
    #[serde(default)]
    pub body: serde_json::Value,
}

impl DaemonEnvelope {
    pub fn status() -> Self {
        Self {
            request_type: DaemonRequestType::Status,
            body: serde_json::Value::Null,
        }
    }

    pub fn commit(body: &CommitBody) -> Result<Self, serde_json::Error> {
        Ok(Self {
            request_type: DaemonRequestType::Commit,
            body: serde_json::to_value(body)?,
        })
    }

    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

/// Body of a commit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitBody {
    pub files: Vec<String>,
    pub frame_start: u16,
    pub frame_end: u16,
}

/// A render node known to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownNode {
    pub name: String,
    pub address: IpAddr,
}

/// Reply written back on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DaemonReply {
    Ok { nodes: Vec<KnownNode> },
    Error { message: String },
}
