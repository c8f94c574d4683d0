//! Framed TCP codec for [`ChatMessage`].
//!
//! Frames are newline-delimited JSON objects: one `serde_json`-encoded
//! [`ChatMessage`] per line. The codec preserves message boundaries over the
//! byte stream and round-trips `sender_id`, `kind` and `body` losslessly.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::message::ChatMessage;

/// Maximum frame length in bytes (excluding the terminating `\n`).
/// A peer that streams more than this without a newline is misbehaving.
const MAX_FRAME_LENGTH: usize = 8192;

/// Codec error: a protocol violation or an I/O error.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("frame exceeds maximum length ({MAX_FRAME_LENGTH} bytes)")]
    FrameTooLong,
    #[error("undecodable frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A tokio codec that frames chat messages on `\n` boundaries.
#[derive(Debug, Default)]
pub struct MessageCodec;

impl Decoder for MessageCodec {
    type Item = ChatMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src.iter().position(|b| *b == b'\n') else {
            // No complete frame yet. Reject a peer that never sends one.
            if src.len() > MAX_FRAME_LENGTH {
                return Err(CodecError::FrameTooLong);
            }
            return Ok(None);
        };

        let line = src.split_to(pos);
        src.advance(1); // skip \n

        Ok(Some(serde_json::from_slice(&line)?))
    }
}

impl Encoder<ChatMessage> for MessageCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ChatMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}
