use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use readlog::application::{ServerConfig, serve};
use readlog::infrastructure::client::ReadlogClient;
use readlog::presentation::cli::{Cli, Commands, ServeCommand, auth, books, dashboard};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Login(cmd) => {
            let client = ReadlogClient::from_base_url(&cli.api_url)?;
            auth::login(&client, cmd).await
        }
        Commands::Book { command } => {
            let client = ReadlogClient::from_base_url(&cli.api_url)?;
            books::run(&client, command).await
        }
        Commands::Dashboard(cmd) => {
            let client = ReadlogClient::from_base_url(&cli.api_url)?;
            dashboard::run(&client, cmd).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    if command.insecure_cookies {
        tracing::warn!(
            "insecure cookies enabled for development/demo setup - do not use in production"
        );
    }

    if command.mail_webhook_url.is_none() {
        tracing::warn!("no mail webhook configured, verification codes will be logged");
    }

    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        insecure_cookies: command.insecure_cookies,
        cover_lookup_url: command.cover_lookup_url,
        mail_webhook_url: command.mail_webhook_url,
        verification_ttl: Duration::from_secs(command.verification_ttl_secs),
        session_ttl: chrono::Duration::hours(command.session_ttl_hours),
    };

    serve(config).await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
