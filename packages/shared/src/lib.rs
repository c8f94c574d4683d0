//! Shared protocol library for the idobata chat application.
//!
//! Defines the wire-level message type exchanged between server and client,
//! the framed TCP codec, and small utilities (logging setup, clock
//! abstraction) used by both binaries.

pub mod codec;
pub mod logger;
pub mod message;
pub mod time;
