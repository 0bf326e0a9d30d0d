//! sqlscope command-line tool.
//!
//! Prints catalog metadata documents of configured datasources and renders
//! dialect-specific sequence statements.
//!
//! # Security Guarantees
//! - Catalog reads only; existence checks that need DDL are rolled back
//! - Connection URLs are redacted in every message

use clap::Parser;
use sqlscope::{Cli, run};
use sqlscope_core::logging::init_logging_with;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with(cli.global.verbose, cli.global.quiet, cli.global.log_format())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match run(&cli, cancel).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
