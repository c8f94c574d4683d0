//! Server-side error taxonomy.
//!
//! Per-connection failures (`SessionError`) are contained at the session
//! boundary: they terminate the offending session and are never propagated
//! to other sessions. Only `ServerError::Bind` is fatal to the process.

use idobata_shared::codec::CodecError;

/// Reasons a login handshake is rejected.
///
/// A rejected session is discarded before it ever enters the registry, so
/// no partial state needs cleaning up.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("nickname '{0}' is already in use")]
    DuplicateNickname(String),
    #[error("first message must be a text frame with the login sender id")]
    UnexpectedFirstMessage,
    #[error("requested nickname is empty")]
    EmptyNickname,
    #[error("connection closed before login completed")]
    ConnectionClosed,
}

/// Why a session's receive loop terminated abnormally.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("login rejected: {0}")]
    Login(#[from] LoginError),
    #[error("transport error: {0}")]
    Transport(#[from] CodecError),
}

/// Errors fatal to the whole server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind listening socket: {0}")]
    Bind(std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
