//! Interactive TCP chat client binary.
//!
//! Connects to an idobata server, registers the given nickname and relays
//! typed lines as chat messages. The user "admin" (case-insensitive) may
//! shut the server down remotely by typing SHUTDOWN.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-client -- --nickname alice
//! cargo run --bin idobata-client -- -n admin -H chat.example.com -p 1500
//! ```

use clap::Parser;

use idobata_client::run_client_session;
use idobata_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "idobata-client")]
#[command(about = "Interactive TCP group chat client", long_about = None)]
struct Args {
    /// Nickname to register (must be unique on the server)
    #[arg(short = 'n', long)]
    nickname: String,

    /// Server host to connect to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to connect to
    #[arg(short = 'p', long, default_value = "1500")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    if let Err(e) = run_client_session(&args.host, args.port, &args.nickname).await {
        tracing::error!("client error: {e}");
        std::process::exit(1);
    }
}
