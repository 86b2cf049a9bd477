//! Content-Length header framing for JSON-RPC messages.
//!
//! Every message travels as a header block terminated by a blank line,
//! followed by exactly the declared number of payload bytes:
//!
//! ```text
//! Content-Length: <decimal-length>\r\n
//! \r\n
//! <payload, exactly decimal-length UTF-8 bytes>
//! ```
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_frame, encode_message, parse_header_line, FrameConfig, HeaderLine, DEFAULT_MAX_PAYLOAD,
    LENGTH_HEADER, TYPE_HEADER,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
