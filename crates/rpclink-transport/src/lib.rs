//! Thread-safe duplex transport over a child process's pipe pair.
//!
//! The transport owns one writable stream (the child's input) and one
//! readable stream (the child's output) and guards each direction with
//! its own lock, so sends proceed while a receive is blocked waiting
//! for bytes. Process spawning and the child's diagnostic stream are
//! the surrounding application's business.

pub mod duplex;

pub use duplex::PipeTransport;
