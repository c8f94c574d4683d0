//! Interactive CLI client for the idobata TCP group chat.
//!
//! Turns typed lines into protocol messages: `LOGOUT` and `SHUTDOWN`
//! (case-insensitive) become control frames, everything else is sent as
//! chat text. Incoming messages are printed as they arrive.

pub mod error;
pub mod formatter;
pub mod input;
pub mod session;

pub use error::ClientError;
pub use session::run_client_session;
