//! Client-side errors.

use idobata_shared::codec::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not connect to the server: {0}")]
    Connect(std::io::Error),
    #[error("login as '{0}' was rejected by the server")]
    LoginRejected(String),
    #[error("connection to the server was lost")]
    ConnectionLost,
    #[error("transport error: {0}")]
    Transport(#[from] CodecError),
}
