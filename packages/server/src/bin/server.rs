//! TCP group chat server binary.
//!
//! Accepts client connections, registers nicknames and relays every message
//! to all connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-server
//! cargo run --bin idobata-server -- --host 0.0.0.0 --port 1500
//! ```

use std::sync::Arc;

use clap::Parser;

use idobata_server::{ServerState, run_server};
use idobata_shared::logger::setup_logger;
use idobata_shared::message::LOGIN_SENDER_ID;
use idobata_shared::time::SystemClock;

#[derive(Parser, Debug)]
#[command(name = "idobata-server")]
#[command(about = "TCP group chat server with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "1500")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let state = Arc::new(ServerState::new(Arc::new(SystemClock)));

    // Ctrl+C triggers the same cooperative shutdown the admin can request
    // in-band.
    let signal_state = Arc::clone(&state);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl+C");
            signal_state.shutdown(LOGIN_SENDER_ID).await;
        }
    });

    if let Err(e) = run_server(&args.host, args.port, state).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
