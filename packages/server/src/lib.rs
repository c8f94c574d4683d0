//! TCP group chat server for idobata.
//!
//! The server accepts client connections, registers nicknames, and relays
//! each message to every connected client. Moderation (ban/unban) and an
//! admin-triggered shutdown are handled in-band through the same message
//! stream.

pub mod broadcast;
pub mod controller;
pub mod domain;
pub mod error;
pub mod moderation;
pub mod registry;
pub mod session;

pub use controller::{ServerState, run_server, serve};
pub use error::{LoginError, ServerError, SessionError};
