// src/control/input_loop.rs

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::control::dispatcher::CommandDispatcher;

/// Interactive control loop over the operator's stdin.
///
/// Reads one line at a time, feeds it to the dispatcher, and prints the
/// response to stdout. Runs until stdin reaches end-of-stream or the shared
/// shutdown token is cancelled (Ctrl-C or a `quit` command).
pub async fn run_input_loop(dispatcher: CommandDispatcher, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("multiserv started - type 'help' for commands");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("control loop stopping (shutdown)");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let response = dispatcher.dispatch(&line).await;
                    println!("{response}");
                }
                Ok(None) => {
                    info!("operator input reached end of stream");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "error reading operator input");
                    break;
                }
            }
        }
    }
}
