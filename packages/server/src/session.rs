//! Per-connection client session: login handshake and receive loop.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use idobata_shared::codec::MessageCodec;
use idobata_shared::message::{ChatMessage, LOGIN_SENDER_ID, MessageKind, is_admin};

use crate::broadcast::{broadcast, broadcast_except};
use crate::controller::ServerState;
use crate::domain::{ModerationCommand, parse_moderation_command};
use crate::error::{LoginError, SessionError};
use crate::registry::{ClientHandle, SessionCommand};

/// Drive one client connection from accept to close.
///
/// The session performs the login handshake, then loops over inbound frames
/// and queued commands until logout, shutdown, or a transport failure. All
/// failures are contained here: the caller only logs the returned error.
pub async fn run_session(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> Result<(), SessionError> {
    let mut framed = Framed::new(stream, MessageCodec);
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Login handshake. A session that fails here is discarded without ever
    // entering the registry; the connection is closed without a reply.
    let (id, nickname) = match login(&mut framed, &state, tx).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("rejecting connection from {addr}: {e}");
            return Err(e);
        }
    };

    // The joining session already got its welcome; only the others are
    // told about the arrival.
    broadcast_except(
        &state,
        &ChatMessage::text(id, format!("{nickname} has joined the chat")),
        id,
    )
    .await;

    // Receive loop. `registered` tracks whether this session still has a
    // registry entry to clean up on exit.
    let mut registered = true;
    loop {
        tokio::select! {
            frame = framed.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::warn!("transport error for '{nickname}' (id {id}): {e}");
                        break;
                    }
                    None => {
                        tracing::info!("lost connection to '{nickname}' (id {id})");
                        break;
                    }
                };

                match message.kind {
                    MessageKind::Text => {
                        handle_text(&state, id, &nickname, message.body).await;
                    }
                    MessageKind::Logout => {
                        state.registry.lock().await.remove_by_id(id);
                        registered = false;
                        tracing::info!("'{nickname}' (id {id}) logged out");
                        break;
                    }
                    MessageKind::Shutdown => {
                        if is_admin(&nickname) {
                            tracing::info!("shutdown requested by '{nickname}'");
                            state.shutdown(id).await;
                            // Keep looping: the queued shutdown notice must
                            // be flushed before the Close command lands.
                        } else {
                            tracing::info!("shutdown request from '{nickname}' denied");
                        }
                    }
                }
            }
            command = rx.recv() => match command {
                Some(SessionCommand::Deliver(message)) => {
                    if framed.send(message).await.is_err() {
                        break;
                    }
                }
                Some(SessionCommand::Close) | None => {
                    registered = false;
                    break;
                }
            }
        }
    }

    if registered {
        state.registry.lock().await.remove_by_id(id);
    }
    let remaining = state.registry.lock().await.len();
    tracing::info!("{remaining} clients connected");

    // Dropping `framed` closes the socket.
    Ok(())
}

/// Perform the login handshake.
///
/// The first frame must be a text message with the reserved login sender id
/// and a non-empty nickname as the body. Registration is an atomic
/// check-and-insert; on success the welcome reply is sent on the same
/// connection, stamped with the assigned id.
async fn login(
    framed: &mut Framed<TcpStream, MessageCodec>,
    state: &ServerState,
    tx: mpsc::UnboundedSender<SessionCommand>,
) -> Result<(i32, String), SessionError> {
    let first = match framed.next().await {
        Some(Ok(message)) => message,
        Some(Err(e)) => return Err(SessionError::Transport(e)),
        None => return Err(LoginError::ConnectionClosed.into()),
    };

    if first.kind != MessageKind::Text || first.sender_id != LOGIN_SENDER_ID {
        return Err(LoginError::UnexpectedFirstMessage.into());
    }
    let nickname = first.body.trim().to_string();
    if nickname.is_empty() {
        return Err(LoginError::EmptyNickname.into());
    }

    let id = state.next_id();
    let connected = {
        let mut registry = state.registry.lock().await;
        registry.try_insert(ClientHandle {
            id,
            nickname: nickname.clone(),
            tx,
        })?;
        registry.len()
    };
    tracing::info!("'{nickname}' joined with id {id}; {connected} clients connected");

    let welcome = ChatMessage::text(id, format!("Welcome {nickname}, your ID is {id}"));
    if let Err(e) = framed.send(welcome).await {
        // The welcome could not be delivered; undo the registration so no
        // ghost entry survives this session.
        state.registry.lock().await.remove_by_id(id);
        return Err(SessionError::Transport(e));
    }

    Ok((id, nickname))
}

/// Dispatch a text message: banned-sender drop, moderation command, or
/// ordinary chat.
async fn handle_text(state: &ServerState, id: i32, nickname: &str, body: String) {
    // Banned senders are silenced here, before interpretation; the
    // broadcast engine checks again for messages that bypass this path.
    if state.moderation.lock().await.is_banned(nickname) {
        tracing::debug!("dropping text from banned user '{nickname}'");
        return;
    }

    match parse_moderation_command(&body) {
        Some(ModerationCommand::Ban(target)) => {
            state.moderation.lock().await.set_banned(&target, true);
            tracing::info!("'{target}' has been banned by '{nickname}'");
            broadcast(
                state,
                &ChatMessage::text(id, format!("{target} has been banned by {nickname}")),
            )
            .await;
        }
        Some(ModerationCommand::Unban(target)) => {
            state.moderation.lock().await.set_banned(&target, false);
            tracing::info!("'{target}' has been unbanned by '{nickname}'");
            broadcast(
                state,
                &ChatMessage::text(id, format!("{target} has been unbanned by {nickname}")),
            )
            .await;
        }
        None => {
            broadcast(state, &ChatMessage::text(id, body)).await;
        }
    }
}
