//! Serves the example echo service over newline-delimited JSON on stdio.
//!
//! Each stdin line is a client message, e.g.
//!
//! ```text
//! {"call_init":{"call_id":1,"info":{"method_id":"echo.Echo/Say","arguments":"{\"text\":\"hi\"}"}}}
//! {"call_init":{"call_id":2,"info":{"method_id":"echo.Echo/Chat"}}}
//! {"call_send":{"call_id":2,"message":{"text":"ping"}}}
//! {"call_end":{"call_id":2}}
//! ```
//!
//! Server messages are written to stdout, one per line. Logs go to stderr and
//! are filtered with `RUST_LOG`.
use example_rpcbus_service_definition::{echo_registry, echo_stub};
use rpcbus::message::{ClientMessage, ServerMessage};
use rpcbus_call::{CallTable, ServerMessageSender, ServiceBinding};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Service ID echoed in every outbound message.
const DEMO_SERVICE_ID: u32 = 1;

/// How often calls completed by the stub are swept from the table.
const REAP_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let binding = ServiceBinding::new(echo_registry()?, echo_stub()?);

    let send: ServerMessageSender = Arc::new(|msg: ServerMessage| match serde_json::to_string(&msg) {
        Ok(line) => println!("{line}"),
        Err(err) => tracing::error!("failed to encode {:?}: {}", msg, err),
    });

    let mut table = CallTable::new(DEMO_SERVICE_ID, binding, send);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reap_interval = tokio::time::interval(REAP_INTERVAL);

    tracing::info!("echo service ready on stdio");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(&line) {
                    Ok(msg) => {
                        if let Err(err) = table.handle_message(msg) {
                            tracing::warn!("{}", err);
                        }
                    }
                    Err(err) => tracing::warn!("ignoring malformed client message: {}", err),
                }
            }
            _ = reap_interval.tick() => {
                let removed = table.reap();
                if removed > 0 {
                    tracing::debug!("reaped {} call(s), {} live", removed, table.len());
                }
            }
        }
    }

    tracing::info!("stdin closed, disposing {} live call(s)", table.len());
    table.dispose_all();

    Ok(())
}
