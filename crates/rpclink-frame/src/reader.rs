use std::io::{BufRead, BufReader, ErrorKind, Read};

use rpclink_proto::Message;

use crate::codec::{parse_header_line, FrameConfig, HeaderLine};
use crate::error::{FrameError, Result};

/// Reads complete framed messages from any `Read` stream.
///
/// Buffering is handled internally — callers always get whole messages.
pub struct FrameReader<T> {
    inner: BufReader<T>,
    line: String,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner: BufReader::new(inner),
            line: String::new(),
            config,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Ok(None)` when the peer has closed its output stream —
    /// orderly termination, not an error.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        let payload = match self.read_payload()? {
            Some(payload) => payload,
            None => return Ok(None),
        };
        let message = serde_json::from_slice(&payload)?;
        Ok(Some(message))
    }

    fn read_payload(&mut self) -> Result<Option<Vec<u8>>> {
        let mut declared: Option<usize> = None;

        loop {
            self.line.clear();
            let read = loop {
                match self.inner.read_line(&mut self.line) {
                    Ok(n) => break n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(FrameError::Io(err)),
                }
            };

            // Closed stream while expecting a header line.
            if read == 0 {
                return Ok(None);
            }

            match parse_header_line(&self.line)? {
                HeaderLine::Blank => break,
                HeaderLine::ContentLength(size) => {
                    if size > self.config.max_payload_size {
                        return Err(FrameError::PayloadTooLarge {
                            size,
                            max: self.config.max_payload_size,
                        });
                    }
                    declared = Some(size);
                }
                HeaderLine::ContentType => {}
            }
        }

        let size = declared.ok_or(FrameError::MissingLength)?;
        let mut payload = vec![0u8; size];
        self.inner.read_exact(&mut payload)?;
        Ok(Some(payload))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        self.inner.get_ref()
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
