//! Line input on a dedicated thread.
//!
//! rustyline's readline is synchronous, so it runs on its own thread and
//! feeds lines to the async side over an unbounded channel. The channel
//! closing (receiver dropped) stops the thread on the next line.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

/// Spawn the readline thread and return the receiving end of its lines.
///
/// Empty lines are skipped. The thread exits on Ctrl+C, Ctrl+D, a readline
/// error, or when the receiver is dropped.
pub fn spawn_input_thread(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("Failed to initialize readline: {e}");
                return;
            }
        };

        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(line).ok();
                    if tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("end of input");
                    break;
                }
                Err(e) => {
                    tracing::error!("readline error: {e}");
                    break;
                }
            }
        }
    });

    rx
}
