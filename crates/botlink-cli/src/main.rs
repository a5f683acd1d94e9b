//! botlink - keeps one account connected to one server.
//!
//! Reads commands from stdin, one per line: `connect`, `disconnect`,
//! `status`, `reconnect`, `reload`, `quit`.

use std::path::PathBuf;

use botlink::{Client, ClientCommand, ClientConfig};
use botlink_auth::OfflineAuthenticator;
use botlink_transport::WebSocketTransport;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "botlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file; a default one is written if it does not exist
    #[arg(short, long, default_value = "botlink.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = ClientConfig::load_or_init(&cli.config);
    let debug = cli.verbose || loaded.as_ref().is_ok_and(|c| c.logging.debug);
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config.display(), error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    let mut client = Client::start(
        config,
        Some(cli.config.clone()),
        OfflineAuthenticator,
        WebSocketTransport::new(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    'session: loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("quit") {
                    break;
                }
                let command = match line.parse::<ClientCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}; {}", ClientCommand::usage());
                        continue;
                    }
                };
                tokio::select! {
                    result = client.execute(command) => match result {
                        Ok(reply) => println!("{reply}"),
                        Err(e) => println!("{command} failed: {e}"),
                    },
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!(%command, "interrupted");
                        break 'session;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    client.shutdown().await?;
    Ok(())
}
