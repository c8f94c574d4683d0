//! Server controller: shared state, accept loop and shutdown sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;

use idobata_shared::message::{ChatMessage, MessageKind};
use idobata_shared::time::Clock;

use crate::broadcast::broadcast;
use crate::error::ServerError;
use crate::moderation::ModerationTable;
use crate::registry::{SessionCommand, SessionRegistry};
use crate::session;

/// How long to wait for session tasks to drain after shutdown before
/// aborting them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Shared server state.
///
/// The controller exclusively owns the registry, the moderation table and
/// the id counter; sessions interact with them only through the atomic
/// operations exposed here and in [`crate::registry`] /
/// [`crate::moderation`], never by direct shared mutation.
pub struct ServerState {
    /// Active sessions, keyed by nickname and by id.
    pub registry: Mutex<SessionRegistry>,
    /// Banned nicknames. Persists for the whole server run.
    pub moderation: Mutex<ModerationTable>,
    /// Clock used to stamp relayed messages.
    pub clock: Arc<dyn Clock>,
    /// Monotonically increasing session id counter.
    next_id: AtomicI32,
    /// Latch making `shutdown` idempotent.
    shutdown_started: AtomicBool,
    /// Server-alive flag. Flipping it to `false` stops the accept loop.
    alive: watch::Sender<bool>,
}

impl ServerState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (alive, _) = watch::channel(true);
        Self {
            registry: Mutex::new(SessionRegistry::new()),
            moderation: Mutex::new(ModerationTable::new()),
            clock,
            next_id: AtomicI32::new(0),
            shutdown_started: AtomicBool::new(false),
            alive,
        }
    }

    /// Return the next session id.
    ///
    /// Ids are strictly increasing across the server's lifetime and never
    /// reused, even when many sessions log in concurrently. The first
    /// assigned id is 1 (0 is reserved for the login request).
    pub fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the server is still accepting and relaying.
    pub fn is_alive(&self) -> bool {
        *self.alive.borrow()
    }

    /// Subscribe to changes of the server-alive flag.
    pub fn subscribe_alive(&self) -> watch::Receiver<bool> {
        self.alive.subscribe()
    }

    /// Execute the shutdown sequence.
    ///
    /// Broadcasts a logout-kind notice attributed to `notice_sender_id` so
    /// clients can print a clean message, sends every session a close
    /// command, and flips the server-alive flag, which stops the accept
    /// loop and closes the listening socket. Idempotent: a second call
    /// returns immediately.
    pub async fn shutdown(&self, notice_sender_id: i32) {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            tracing::debug!("shutdown already in progress");
            return;
        }
        tracing::info!("shutting down the server");

        // The notice goes out while the sender is still registered; if the
        // sender id resolves to nobody (e.g. signal-triggered shutdown) the
        // engine drops it silently.
        let notice = ChatMessage::new(
            notice_sender_id,
            MessageKind::Logout,
            "Server is shutting down",
        );
        broadcast(self, &notice).await;

        let handles = self.registry.lock().await.drain();
        for handle in handles {
            // A session that already exited has dropped its receiver;
            // nothing left to close there.
            let _ = handle.tx.send(SessionCommand::Close);
        }

        let _ = self.alive.send(false);
    }
}

/// Bind the listening socket and serve until shutdown.
///
/// Bind failure is fatal; the caller exits the process with a non-zero
/// status.
pub async fn run_server(host: &str, port: u16, state: Arc<ServerState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(ServerError::Bind)?;
    serve(listener, state).await
}

/// Accept loop over an already-bound listener.
///
/// Each accepted connection becomes an independent session task. A failed
/// accept is logged and the loop continues; a single bad connection must
/// not bring the server down. The loop exits when the server-alive flag
/// flips; the listener is then dropped and the remaining session tasks are
/// given a grace period to flush and exit.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> Result<(), ServerError> {
    tracing::info!("chat server listening on {}", listener.local_addr()?);

    let mut alive_rx = state.subscribe_alive();
    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    tracing::info!("new connection from {addr}");
                    let state = Arc::clone(&state);
                    sessions.spawn(async move {
                        if let Err(e) = session::run_session(stream, addr, state).await {
                            tracing::warn!("session from {addr} ended: {e}");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("failed to accept connection: {e}");
                }
            },
            _ = alive_rx.changed() => break,
        }
    }

    // Close the listening socket before waiting on sessions.
    drop(listener);

    let drain = async {
        while sessions.join_next().await.is_some() {}
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        tracing::warn!("session tasks did not drain in time, aborting them");
        sessions.abort_all();
    }

    tracing::info!("server shutdown complete");
    Ok(())
}
