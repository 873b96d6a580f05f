//! lds-testserver — start a test server from command-line flags.
//!
//! ```text
//! lds-testserver -au <uri> -an <name> -c <cap1:cap2:...> -p <port> -d ON
//! ```
//!
//! Runs until Ctrl-C. Exit codes: 0 after a clean shutdown, 1 bad argument
//! count, 2 unknown option, 3 bad configuration value, 4 runtime failure.

use std::process::ExitCode;

use lds_testserver::{ErrorKind, HttpRuntime, launch};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: lds-testserver [-au <application uri>] [-an <application name>]
                      [-c <cap1:cap2:...>] -p <port> [-d ON]";

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG controls verbosity, info by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let tokens: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let cancel = CancellationToken::new();

    // Ctrl-C handler — cancels the root token so the server stops serving
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Shutting down test server...");
        cancel_for_signal.cancel();
    });

    match launch(&tokens, &HttpRuntime::default(), cancel).await {
        Ok(()) => {
            tracing::info!("Test server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "test server failed");
            eprintln!("error: {e}");
            if matches!(e.kind(), ErrorKind::ArgumentCount | ErrorKind::UnknownFlag) {
                eprintln!("{USAGE}");
            }
            ExitCode::from(e.kind().exit_code())
        }
    }
}
