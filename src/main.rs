//! Email Wallets Waitlist Server
//!
//! Issues verification tokens after OTP confirmation, sends welcome emails and
//! records waitlist signups.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use chrono::Utc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use emailwallets_server::config::{Config, SecretSource};
use emailwallets_server::mail::ResendMailer;
use emailwallets_server::rate_limit::{
    MemoryRateLimitStore, PgRateLimitStore, RateLimitStore, SlidingWindowLimiter,
};
use emailwallets_server::state::AppState;
use emailwallets_server::verification::VerificationKeys;
use emailwallets_server::waitlist::{NotionDirectory, PgSignupArchive};
use emailwallets_server::middleware::{self, ClientRateLimit};
use emailwallets_server::{build_router, db};

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = %config.environment.as_str(), "Starting waitlist server");

    if config.token_secret_source == SecretSource::DevelopmentDefault {
        tracing::warn!(
            environment = %config.environment.as_str(),
            "VERIFICATION_TOKEN_SECRET not set, signing with the insecure development default"
        );
    }

    let verification_keys = Arc::new(VerificationKeys::from_secret(&config.token_secret));
    let directory = Arc::new(NotionDirectory::new(&config.notion));
    let mailer = Arc::new(ResendMailer::new(config.mail.clone()));

    let mut app_state = AppState::new(
        verification_keys,
        directory,
        mailer,
        config.allowed_origins.clone(),
    );

    let rate_limit_store: Arc<dyn RateLimitStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            if let Some(masked) = config.database_url_masked() {
                tracing::info!("Using database at {}", masked);
            }
            let db_pool = db::create_pool(database_url, config.db_max_connections)
                .context("Invalid DATABASE_URL")?;

            if let Err(e) = db::run_migrations(&db_pool).await {
                tracing::warn!(error = %e, "Database unavailable at startup, optional features will fail open");
            }

            app_state = app_state
                .with_archive(Arc::new(PgSignupArchive::new(db_pool.clone())))
                .with_db_pool(db_pool.clone());

            let store = PgRateLimitStore::new(db_pool);
            spawn_pg_cleanup(store.clone(), config.rate_limit_window);
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, rate limits are per-instance and signups are not archived");
            let store = MemoryRateLimitStore::new();
            spawn_memory_cleanup(store.clone(), config.rate_limit_window);
            Arc::new(store)
        }
    };

    let mail_limiter = SlidingWindowLimiter::new(
        rate_limit_store,
        config.rate_limit_window,
        config.rate_limit_max_requests,
    );
    if config.trusted_proxies.is_empty() {
        tracing::info!("No trusted proxies configured, rate limiting on the socket peer address");
    }
    let mail_rate_limit =
        ClientRateLimit::new(mail_limiter).trust_proxies(config.trusted_proxies.clone());

    let mut app = build_router(app_state, mail_rate_limit);
    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }
    let app = app.layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn spawn_pg_cleanup(store: PgRateLimitStore, window: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let cutoff = Utc::now() - chrono::Duration::seconds(window.as_secs() as i64);
            match store.purge_before(cutoff).await {
                Ok(removed) => tracing::debug!(removed, "Purged expired rate limit hits"),
                Err(e) => tracing::warn!(error = %e, "Rate limit purge failed"),
            }
        }
    });
}

fn spawn_memory_cleanup(store: MemoryRateLimitStore, window: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let cutoff = Utc::now() - chrono::Duration::seconds(window.as_secs() as i64);
            store.cleanup(cutoff).await;
        }
    });
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins_str = allowed_origins.unwrap_or_default();

    if allowed_origins_str.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
