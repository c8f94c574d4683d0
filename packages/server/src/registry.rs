//! Session registry: the single source of truth for "who is connected".
//!
//! The registry keeps two views of the same set, nickname to handle and
//! id to nickname, that must always agree: every registered id maps to
//! exactly one nickname and vice versa. All mutation happens through the
//! methods here while the caller holds the registry mutex, so the two views
//! can never be observed out of sync.

use std::collections::HashMap;

use tokio::sync::mpsc;

use idobata_shared::message::ChatMessage;

use crate::error::LoginError;

/// Command delivered to a session task through its registry handle.
#[derive(Debug)]
pub enum SessionCommand {
    /// Write this message to the session's connection.
    Deliver(ChatMessage),
    /// Close the session's connection and terminate its loop.
    Close,
}

/// Handle to a live session, held by the registry.
///
/// The registry does not own the connection; dropping a handle (or failing
/// to send on `tx`) does not close the socket by itself; the session task
/// does that when its loop exits.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    /// Server-assigned id, unique for the lifetime of the process.
    pub id: i32,
    /// Nickname fixed at login.
    pub nickname: String,
    /// Sender half of the session's command channel.
    pub tx: mpsc::UnboundedSender<SessionCommand>,
}

/// Table of active sessions keyed by nickname and by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_nickname: HashMap<String, ClientHandle>,
    by_id: HashMap<i32, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check for a duplicate nickname and insert the handle.
    ///
    /// The check and the insert form one critical section (the caller holds
    /// the registry lock), so two sessions requesting the same nickname can
    /// never both succeed.
    pub fn try_insert(&mut self, handle: ClientHandle) -> Result<(), LoginError> {
        if self.by_nickname.contains_key(&handle.nickname) {
            return Err(LoginError::DuplicateNickname(handle.nickname));
        }
        self.by_id.insert(handle.id, handle.nickname.clone());
        self.by_nickname.insert(handle.nickname.clone(), handle);
        Ok(())
    }

    /// Remove a session by id, returning its handle if it was registered.
    ///
    /// Returns `None` when the id is stale (already removed); callers
    /// treat that as "session already gone" and do nothing.
    pub fn remove_by_id(&mut self, id: i32) -> Option<ClientHandle> {
        let nickname = self.by_id.remove(&id)?;
        self.by_nickname.remove(&nickname)
    }

    /// Resolve an id to a nickname. `None` means the sender is gone.
    pub fn nickname(&self, id: i32) -> Option<String> {
        self.by_id.get(&id).cloned()
    }

    /// Whether a nickname currently denotes a live session.
    pub fn contains(&self, nickname: &str) -> bool {
        self.by_nickname.contains_key(nickname)
    }

    /// Snapshot of every live handle, for broadcast fan-out.
    pub fn handles(&self) -> Vec<ClientHandle> {
        self.by_nickname.values().cloned().collect()
    }

    /// Remove and return every handle, leaving the registry empty.
    /// Used by the shutdown sequence.
    pub fn drain(&mut self) -> Vec<ClientHandle> {
        self.by_id.clear();
        self.by_nickname.drain().map(|(_, handle)| handle).collect()
    }

    /// Number of connected sessions.
    pub fn len(&self) -> usize {
        self.by_nickname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nickname.is_empty()
    }
}
