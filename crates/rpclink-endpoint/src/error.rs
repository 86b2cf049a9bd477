use std::time::Duration;

use rpclink_proto::ResponseError;
use serde_json::Value;

/// Errors surfaced to a caller of the endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// Framing or I/O fault while sending.
    #[error("frame error: {0}")]
    Frame(#[from] rpclink_frame::FrameError),

    /// The peer answered the call with an error object.
    #[error("remote error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// No response arrived within the caller's deadline.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The dispatch worker thread could not be spawned.
    #[error("failed to spawn dispatch thread: {0}")]
    Spawn(std::io::Error),
}

impl From<ResponseError> for EndpointError {
    fn from(error: ResponseError) -> Self {
        EndpointError::Remote {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

pub type Result<T> = std::result::Result<T, EndpointError>;
