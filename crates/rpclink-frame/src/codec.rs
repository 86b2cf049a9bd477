use rpclink_proto::Message;

use crate::error::{FrameError, Result};

/// Header line carrying the payload length. The trailing space is part
/// of the prefix; `Content-Length:42` is an unknown header.
pub const LENGTH_HEADER: &str = "Content-Length: ";

/// Header line accepted and discarded.
pub const TYPE_HEADER: &str = "Content-Type: ";

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// One parsed header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// Blank line: end of the header block.
    Blank,
    /// `Content-Length` with its parsed value.
    ContentLength(usize),
    /// `Content-Type`, accepted and ignored.
    ContentType,
}

/// Parse one raw header line, terminator included.
pub fn parse_header_line(line: &str) -> Result<HeaderLine> {
    let line = line
        .strip_suffix("\r\n")
        .ok_or(FrameError::MissingNewline)?;

    if line.is_empty() {
        return Ok(HeaderLine::Blank);
    }

    if let Some(rest) = line.strip_prefix(LENGTH_HEADER) {
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FrameError::InvalidLength(rest.to_string()));
        }
        let size = rest
            .parse()
            .map_err(|_| FrameError::InvalidLength(rest.to_string()))?;
        return Ok(HeaderLine::ContentLength(size));
    }

    if line.strip_prefix(TYPE_HEADER).is_some() {
        return Ok(HeaderLine::ContentType);
    }

    Err(FrameError::UnknownHeader(line.to_string()))
}

/// Encode a payload into the wire format, appending to `dst`.
///
/// The length header is the only header emitted.
pub fn encode_frame(payload: &[u8], dst: &mut Vec<u8>) {
    dst.extend_from_slice(LENGTH_HEADER.as_bytes());
    dst.extend_from_slice(payload.len().to_string().as_bytes());
    dst.extend_from_slice(b"\r\n\r\n");
    dst.extend_from_slice(payload);
}

/// Serialize a message and frame it in one step.
pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(message)?;
    let mut wire = Vec::with_capacity(LENGTH_HEADER.len() + 24 + payload.len());
    encode_frame(&payload, &mut wire);
    Ok(wire)
}
