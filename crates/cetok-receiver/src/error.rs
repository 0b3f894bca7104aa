//! Receiver error types

use std::net::SocketAddr;
use std::path::PathBuf;

/// Startup and server failures
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("failed to determine current namespace: cannot read {}: {source}", .path.display())]
    NamespaceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to determine current namespace: {} is empty", .path.display())]
    NamespaceEmpty { path: PathBuf },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// An inbound request that is not a usable CloudEvent.
///
/// Rejected with `400 Bad Request` before any job is generated.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("missing required CloudEvents attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("unsupported CloudEvents specversion '{0}'")]
    UnsupportedSpecVersion(String),

    #[error("malformed structured CloudEvent: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("invalid data_base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("event data is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("event data must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
