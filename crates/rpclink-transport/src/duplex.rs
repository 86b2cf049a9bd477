use std::io::{Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rpclink_frame::{FrameConfig, FrameReader, FrameWriter, Result};
use rpclink_proto::Message;

/// Duplex pipe pair with one lock per direction.
///
/// The two locks are never unified: arbitrary caller threads send while
/// exactly one dispatch thread sits blocked in [`receive`](Self::receive).
pub struct PipeTransport<R, W> {
    reader: Mutex<FrameReader<R>>,
    writer: Mutex<FrameWriter<W>>,
}

impl<R: Read, W: Write> PipeTransport<R, W> {
    /// Wrap the inbound (child output) and outbound (child input) streams.
    pub fn new(inbound: R, outbound: W) -> Self {
        Self::with_config(inbound, outbound, FrameConfig::default())
    }

    /// Wrap the streams with explicit codec configuration.
    pub fn with_config(inbound: R, outbound: W, config: FrameConfig) -> Self {
        Self {
            reader: Mutex::new(FrameReader::with_config(inbound, config.clone())),
            writer: Mutex::new(FrameWriter::with_config(outbound, config)),
        }
    }

    /// Encode and send one message: lock the write side, write, flush.
    pub fn send(&self, message: &Message) -> Result<()> {
        lock(&self.writer).write_message(message)
    }

    /// Receive one message: lock the read side and decode the next frame.
    ///
    /// `Ok(None)` signals orderly end of stream.
    pub fn receive(&self) -> Result<Option<Message>> {
        lock(&self.reader).read_message()
    }
}

// The guarded sections only run the codec, which does not panic; if a lock
// is ever poisoned the stream state is still the best state we have.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
