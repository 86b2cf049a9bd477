//! Thread-safe JSON-RPC client endpoint over a child process's pipes.
//!
//! This is the "just works" layer. Issue calls from any number of
//! threads; a single background dispatch loop routes every inbound
//! frame back to the caller waiting on its correlation id, hands peer
//! notifications to an application hook, and detects stream
//! termination or a server-initiated shutdown.

mod dispatch;
pub mod endpoint;
pub mod error;
mod pending;

pub use endpoint::{Endpoint, EndpointConfig, InboundHandler, DEFAULT_CALL_TIMEOUT};
pub use error::{EndpointError, Result};
