//! Terminal formatting for the client.

use std::io::Write;

use idobata_shared::message::ChatMessage;

/// The interactive prompt for a given nickname.
pub fn prompt(nickname: &str) -> String {
    format!("{nickname}> ")
}

/// Format an incoming message for display.
///
/// The server already stamps relayed bodies with the sender's nickname and
/// a timestamp, so the client prints the body as-is on its own line.
pub fn format_incoming(message: &ChatMessage) -> String {
    format!("\n{}\n", message.body)
}

/// Re-print the prompt after asynchronous output interrupted it.
pub fn redisplay_prompt(nickname: &str) {
    print!("{}", prompt(nickname));
    let _ = std::io::stdout().flush();
}
