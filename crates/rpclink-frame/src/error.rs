/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A header line did not end with the `\r\n` terminator.
    #[error("bad header: missing newline")]
    MissingNewline,

    /// The `Content-Length` value is not a plain decimal integer.
    #[error("bad header: size is not int ({0:?})")]
    InvalidLength(String),

    /// The header block contained a line this codec does not know.
    #[error("bad header: unknown header ({0:?})")]
    UnknownHeader(String),

    /// The header block ended without a `Content-Length` line.
    #[error("bad header: missing size")]
    MissingLength,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload is not a well-formed JSON-RPC message.
    #[error("invalid message payload: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
