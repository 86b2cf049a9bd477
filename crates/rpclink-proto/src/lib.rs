//! JSON-RPC message schema for rpclink.
//!
//! Every message shape that crosses the wire is an explicit, tagged
//! structure here. There is no reflection-based serialization anywhere
//! in the stack.

pub mod message;

pub use message::{
    Message, Notification, Request, Response, ResponseError, EXIT_METHOD, SHUTDOWN_CODE,
};
