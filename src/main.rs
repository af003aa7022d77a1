//! CLI for newt_ws
//!
//! Subcommands:
//! - `check`: load and validate the configuration
//! - `token`: obtain a session token and print it
//! - `connect`: authenticate, open the websocket and print received envelopes

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use newt_ws::auth::HttpTokenIssuer;
use newt_ws::config::{PartialConfig, load_config_with};
use newt_ws::{Connection, Session, WsMessage};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "newt-ws", version, about = "Control-plane websocket client")]
struct Cli {
    /// Configuration file; defaults to config/newt.* when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the configuration file and environment.
#[derive(Args)]
struct Overrides {
    #[arg(long = "id", global = true)]
    identifier: Option<String>,
    #[arg(long, global = true)]
    secret: Option<String>,
    #[arg(long, global = true)]
    token: Option<String>,
    #[arg(long, global = true)]
    endpoint: Option<String>,
    #[arg(long, global = true)]
    tls_client_cert: Option<String>,
}

impl From<Overrides> for PartialConfig {
    fn from(o: Overrides) -> Self {
        PartialConfig {
            identifier: o.identifier,
            secret: o.secret,
            token: o.token,
            endpoint: o.endpoint,
            tls_client_cert: o.tls_client_cert,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Validate the configuration without touching the network
    Check,
    /// Obtain a session token and print it
    Token,
    /// Connect and print every received envelope as a JSON line
    Connect {
        /// Type of an envelope to send once connected
        #[arg(long)]
        send: Option<String>,
        /// JSON payload for --send
        #[arg(long, requires = "send")]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    newt_ws::utils::logging::init(&cli.log_level);

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with(cli.config.as_deref(), cli.overrides.into())?;
    let session = Session::new(config)?;

    match cli.command {
        Command::Check => {
            info!(config = ?session.config(), "configuration is valid");
        }
        Command::Token => {
            let issuer = HttpTokenIssuer::new(&session.config().endpoint)?;
            let token = session.authenticate(&issuer).await?;
            println!("{token}");
        }
        Command::Connect { send, data } => {
            let issuer = HttpTokenIssuer::new(&session.config().endpoint)?;
            session.authenticate(&issuer).await?;
            run_connection(&session, send, data).await?;
        }
    }

    Ok(())
}

async fn run_connection(
    session: &Session,
    send: Option<String>,
    data: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = Connection::open(session).await?;

    if let Some(kind) = send {
        let payload = match data {
            Some(raw) => serde_json::from_str(&raw)?,
            None => serde_json::Value::Null,
        };
        conn.send(&WsMessage::new(kind, payload)).await?;
    }

    loop {
        let received = tokio::select! {
            received = conn.recv() => received,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        };

        match received {
            Some(Ok(message)) => println!("{}", message.to_json()?),
            Some(Err(
                e @ (newt_ws::Error::MalformedEnvelope(_) | newt_ws::Error::NestingTooDeep { .. }),
            )) => error!("skipping frame: {e}"),
            Some(Err(e)) => return Err(e.into()),
            None => {
                info!("connection closed by peer");
                return Ok(());
            }
        }
    }

    conn.close().await?;
    Ok(())
}
