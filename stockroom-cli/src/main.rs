//! stockroom CLI - record-management service entry points
//!
//! Two ways to host the same router:
//! - `serve` runs the long-lived HTTP server
//! - `invoke` processes a single serverless invocation event from stdin
//!   and writes the platform response to stdout

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stockroom_core::{ConnectionConfig, Database, Profile, DEFAULT_IDLE_RECLAIM_THRESHOLD};
use stockroom_server::serverless::{handle_invocation, InvocationEvent};
use stockroom_server::{run_server, AppState, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(name = "stockroom", version, about = "Record-management HTTP service")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the long-lived HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        /// Do not serve the OpenAPI document
        #[arg(long)]
        no_docs: bool,
    },

    /// Process one serverless invocation event from stdin
    Invoke {
        /// Deployment-stage path prefix to strip (e.g. "/dev"); falls
        /// back to the STAGE_PREFIX environment variable
        #[arg(long)]
        stage_prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    match cli.command {
        Command::Serve { bind, no_docs } => serve(bind, !no_docs).await,
        Command::Invoke { stage_prefix } => invoke(stage_prefix).await,
    }
}

async fn serve(bind: SocketAddr, expose_docs: bool) -> Result<()> {
    let config = ConnectionConfig::from_env(Profile::Server);
    tracing::info!(
        host = %config.host,
        database = %config.database,
        max_connections = config.max_connections,
        "resolved database configuration"
    );
    let db = Database::new(config);

    let server_config = ServerConfig {
        bind_addr: bind,
        expose_docs,
    };
    run_server(db, server_config).await.context("server error")
}

async fn invoke(stage_prefix: Option<String>) -> Result<()> {
    let config = ConnectionConfig::from_env(Profile::Serverless);
    let state = AppState::new(Database::new(config), false);

    let raw = std::io::read_to_string(std::io::stdin())
        .context("failed to read invocation event from stdin")?;
    let event: InvocationEvent = serde_json::from_str(&raw).context("invalid invocation event")?;

    let stage_prefix = stage_prefix
        .or_else(|| std::env::var("STAGE_PREFIX").ok())
        .unwrap_or_default();
    tracing::debug!(stage_prefix = %stage_prefix, "handling invocation event");

    let response = handle_invocation(
        state,
        event,
        &stage_prefix,
        DEFAULT_IDLE_RECLAIM_THRESHOLD,
    )
    .await;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
