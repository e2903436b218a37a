//! Debit Booking Service - Main Application Entry Point
//!
//! REST API server that books debits against accounts. A booking
//! resolves the account through the account service, writes the ledger
//! entry inside a local transaction, notifies the balance service, and
//! collects fees best-effort behind a circuit breaker.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Downstream calls**: reqwest with typed per-service clients
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool (bounded retry)
//! 3. Run database migrations
//! 4. Wire the debit service with its collaborators
//! 5. Build HTTP router and serve until SIGINT/SIGTERM

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get, routing::post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use debit_booking_service::breaker::{CircuitBreaker, CircuitBreakerConfig};
use debit_booking_service::clients::account::HttpAccountResolver;
use debit_booking_service::clients::balance::HttpBalanceNotifier;
use debit_booking_service::clients::fees::HttpFeeProvider;
use debit_booking_service::services::debit_service::DebitService;
use debit_booking_service::store::PgLedgerStore;
use debit_booking_service::{AppState, config, db, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool (retried a few times; the database may come up late)
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // One shared HTTP client for all downstream services
    let http_client =
        debit_booking_service::clients::build_http_client(Duration::from_secs(config.http_timeout_secs))
            .map_err(|err| anyhow::anyhow!("http client: {err}"))?;

    // Wire the orchestrator with explicit collaborators
    let store = Arc::new(PgLedgerStore::new(pool.clone()));
    let accounts = Arc::new(HttpAccountResolver::new(
        http_client.clone(),
        config.account_service_url.clone(),
        config.account_service_api_id.clone(),
    ));
    let balance = Arc::new(HttpBalanceNotifier::new(
        http_client.clone(),
        config.balance_service_url.clone(),
        config.balance_service_api_id.clone(),
    ));
    let fees = Arc::new(HttpFeeProvider::new(
        http_client,
        config.fee_service_url.clone(),
        config.fee_service_api_id.clone(),
    ));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: config.breaker_failure_threshold,
        cooldown: Duration::from_secs(config.breaker_cooldown_secs),
    }));

    let debits = Arc::new(DebitService::new(store, accounts, balance, fees, breaker));
    let state = AppState { pool, debits };

    let app = Router::new()
        // Debit routes
        .route("/add", post(handlers::debits::add_debit))
        .route("/list/{id}", get(handlers::debits::list_debits))
        .route("/listPerDate", get(handlers::debits::list_debits_per_date))
        // Probes
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::live))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share application state with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serve HTTP requests until a shutdown signal arrives
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve when SIGINT (Ctrl+C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
