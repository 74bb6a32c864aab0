//! Tabhost headless shell
//!
//! Reads console commands from stdin and prints tab events, renderer
//! messages and command replies to stdout as JSON lines. Logs go to stderr.
//!
//! Usage: `tabhost [config.json]`

use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tabhost_core::{ShellConfig, Storage};
use tabhost_shell::{parse, ConsoleCommand, Shell, ShellOutputs};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => ShellConfig::default_path()?,
    };
    let config = ShellConfig::load(&config_path)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tabhost v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.data_dir();
    let storage = match Storage::new_with_path(&data_dir) {
        Ok(storage) => storage,
        Err(e) => {
            warn!("Failed to open storage in {:?}, using in-memory: {}", data_dir, e);
            Storage::in_memory()?
        }
    };

    let (shell, outputs) = Shell::start(&config, Some(Arc::new(storage)))?;
    let printer = tokio::spawn(print_outputs(outputs));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse(&line) {
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", json!({ "type": "error", "message": e.to_string() }));
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(value) => println!("{}", json!({ "type": "reply", "value": value })),
            Err(e) => println!("{}", json!({ "type": "error", "message": format!("{:#}", e) })),
        }
    }

    shell.shutdown().await?;
    printer.abort();
    Ok(())
}

/// Print outbound events and renderer messages as they arrive
async fn print_outputs(mut outputs: ShellOutputs) {
    loop {
        tokio::select! {
            event = outputs.events.recv() => match event {
                Ok(event) => println!("{}", json!({ "type": "event", "event": event })),
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} tab events", skipped),
                Err(RecvError::Closed) => break,
            },
            message = outputs.renderer.recv() => match message {
                Some(message) => println!("{}", json!({ "type": "renderer", "message": message })),
                None => break,
            },
        }
    }
}
