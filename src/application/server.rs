use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::database::Database;

/// How often expired sessions, verification codes and idle rate-limit buckets are purged.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(300);

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub insecure_cookies: bool,
    pub cover_lookup_url: String,
    pub mail_webhook_url: Option<String>,
    pub verification_ttl: Duration,
    pub session_ttl: chrono::Duration,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    database
        .migrate()
        .await
        .context("failed to run database migrations")?;

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            insecure_cookies: config.insecure_cookies,
            cover_lookup_url: config.cover_lookup_url,
            mail_webhook_url: config.mail_webhook_url,
            verification_ttl: config.verification_ttl,
            session_ttl: config.session_ttl,
        },
    );

    // Clean up expired sessions on startup
    if let Err(err) = state.session_repo.delete_expired(Utc::now()).await {
        warn!(error = %err, "failed to clean up expired sessions on startup");
    }

    tokio::spawn(housekeeping_task(state.clone(), HOUSEKEEPING_INTERVAL));

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    database.close().await;
    info!("server shutdown complete");

    Ok(())
}

async fn housekeeping_task(state: AppState, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately; startup already cleaned up.
    interval.tick().await;
    loop {
        interval.tick().await;
        match state.session_repo.delete_expired(Utc::now()).await {
            Ok(count) if count > 0 => info!(count, "removed expired sessions"),
            Err(err) => warn!(error = %err, "expired session cleanup failed"),
            _ => {}
        }
        let codes = state.verification_store.purge_expired();
        if codes > 0 {
            info!(count = codes, "purged expired verification codes");
        }
        let buckets = state.auth_rate_limit.prune_idle();
        if buckets > 0 {
            tracing::debug!(count = buckets, "pruned idle rate limit buckets");
        }
    }
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
