//! Protocol message types.
//!
//! A [`ChatMessage`] is the single unit of exchange on the wire: the server
//! and the client never send anything else. Messages are immutable once
//! constructed.

use serde::{Deserialize, Serialize};

/// Sender id carried by the unauthenticated login request.
///
/// A client does not have an id before the server assigns one, so the login
/// frame is sent with this reserved value and the requested nickname as the
/// body.
pub const LOGIN_SENDER_ID: i32 = 0;

/// Nickname of the user allowed to shut the server down remotely.
/// Compared case-insensitively.
pub const ADMIN_NICKNAME: &str = "admin";

/// Check whether a nickname belongs to the server administrator.
pub fn is_admin(nickname: &str) -> bool {
    nickname.eq_ignore_ascii_case(ADMIN_NICKNAME)
}

/// Kind of a protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Ordinary chat text (also used for the login request and for
    /// server-generated notices).
    Text,
    /// The sender is leaving the chat; as a server-to-client frame it also
    /// announces that the server is closing the session.
    Logout,
    /// Request to shut the server down. Honored only for the admin.
    Shutdown,
}

/// The unit of protocol exchange: sender id, kind and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned id of the sending session (`0` before login).
    pub sender_id: i32,
    /// Message kind.
    pub kind: MessageKind,
    /// Message body. For login requests this is the requested nickname.
    pub body: String,
}

impl ChatMessage {
    /// Create a message of the given kind.
    pub fn new(sender_id: i32, kind: MessageKind, body: impl Into<String>) -> Self {
        Self {
            sender_id,
            kind,
            body: body.into(),
        }
    }

    /// Create an ordinary text message.
    pub fn text(sender_id: i32, body: impl Into<String>) -> Self {
        Self::new(sender_id, MessageKind::Text, body)
    }

    /// Create the login request carrying the requested nickname.
    pub fn login(nickname: &str) -> Self {
        Self::new(LOGIN_SENDER_ID, MessageKind::Text, nickname)
    }
}
