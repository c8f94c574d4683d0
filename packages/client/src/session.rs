//! Client session: login handshake, then concurrent read and write loops.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use idobata_shared::codec::MessageCodec;
use idobata_shared::message::{ChatMessage, MessageKind, is_admin};

use crate::error::ClientError;
use crate::formatter::{format_incoming, prompt, redisplay_prompt};
use crate::input::spawn_input_thread;

/// Outcome of the read loop.
enum ReadEnd {
    /// The server announced shutdown (logout-kind frame); a clean end.
    ServerClosed,
    /// The stream ended or failed without notice.
    Lost,
}

/// Connect, log in, and run the interactive session until logout,
/// server shutdown, or connection loss.
pub async fn run_client_session(
    host: &str,
    port: u16,
    nickname: &str,
) -> Result<(), ClientError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(ClientError::Connect)?;
    let mut framed = Framed::new(stream, MessageCodec);

    // Login handshake: send the nickname, wait for the welcome carrying the
    // assigned id. The server closes the connection without a reply when it
    // rejects the login.
    framed.send(ChatMessage::login(nickname)).await?;
    let welcome = match framed.next().await {
        Some(Ok(message)) => message,
        Some(Err(e)) => return Err(e.into()),
        None => return Err(ClientError::LoginRejected(nickname.to_string())),
    };
    let id = welcome.sender_id;

    tracing::info!("connected to the chat server with id {id}");
    println!("\n{}", welcome.body);
    println!("Type messages and press Enter to send. LOGOUT leaves the chat.\n");

    let (mut sink, mut stream) = framed.split();

    // Read task: print every incoming message, stop on a logout-kind frame
    // (server shutdown) or when the stream ends.
    let nickname_for_read = nickname.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(message) => {
                    print!("{}", format_incoming(&message));
                    redisplay_prompt(&nickname_for_read);
                    if message.kind == MessageKind::Logout {
                        tracing::info!("server closed the session");
                        return ReadEnd::ServerClosed;
                    }
                }
                Err(e) => {
                    tracing::warn!("read error: {e}");
                    return ReadEnd::Lost;
                }
            }
        }
        ReadEnd::Lost
    });

    // Write task: turn typed lines into protocol messages.
    let mut input_rx = spawn_input_thread(prompt(nickname));
    let nickname_for_write = nickname.to_string();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            if line.eq_ignore_ascii_case("logout") {
                let _ = sink
                    .send(ChatMessage::new(id, MessageKind::Logout, ""))
                    .await;
                println!("Leaving the chat.");
                break;
            }
            if line.eq_ignore_ascii_case("shutdown") {
                if is_admin(&nickname_for_write) {
                    let _ = sink
                        .send(ChatMessage::new(id, MessageKind::Shutdown, ""))
                        .await;
                    println!("Shutting down the server and closing the client.");
                    break;
                }
                println!("Only the admin can shut down the server.");
                continue;
            }
            if sink.send(ChatMessage::text(id, line)).await.is_err() {
                tracing::warn!("failed to send message");
                break;
            }
        }
    });

    // Whichever loop finishes first decides the session's fate.
    tokio::select! {
        read_end = &mut read_task => {
            write_task.abort();
            match read_end {
                Ok(ReadEnd::ServerClosed) => Ok(()),
                _ => Err(ClientError::ConnectionLost),
            }
        }
        _ = &mut write_task => {
            // The user logged out (or shut the server down); a clean exit.
            read_task.abort();
            Ok(())
        }
    }
}
