//! Thread-safe JSON-RPC over child-process pipes.
//!
//! rpclink talks to a child process over its input and output pipes,
//! framing every message with an explicit `Content-Length` header,
//! correlating asynchronous requests to their eventual responses, and
//! running a single background dispatch loop that routes inbound
//! frames and detects stream termination or server-initiated shutdown.
//!
//! # Crate Structure
//!
//! - [`proto`] — explicit message schema (requests, responses, notifications)
//! - [`frame`] — Content-Length header framing codec
//! - [`transport`] — duplex pipe pair with one lock per direction
//! - [`endpoint`] — correlation engine, dispatch loop, lifecycle control

/// Re-export message schema types.
pub mod proto {
    pub use rpclink_proto::*;
}

/// Re-export framing types.
pub mod frame {
    pub use rpclink_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use rpclink_transport::*;
}

/// Re-export endpoint types.
pub mod endpoint {
    pub use rpclink_endpoint::*;
}

pub use rpclink_endpoint::{Endpoint, EndpointConfig, EndpointError};
pub use rpclink_transport::PipeTransport;
