//! Appointment webhook receiver entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use carehook_api::config::Config;
use carehook_api::error::AppError;
use carehook_api::state::AppState;
use carehook_core::clock::{Clock, SystemClock};
use carehook_core::repository::EventStore;
use carehook_core::schema::{SchemaSource, SchemaStore};
use carehook_core::validation::Validator;
use carehook_event_store::SqliteEventStore;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting appointment webhook service");

    let config = Config::from_env()?;

    // Open and prepare the event store.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let event_store = Arc::new(
        SqliteEventStore::connect(
            &config.database_url,
            config.database_max_connections,
            clock.clone(),
        )
        .await?,
    );
    event_store.initialize().await?;

    // Load the validation schema; a missing or broken file falls back to the
    // built-in schema.
    let loaded = SchemaStore::load(&config.schema_path);
    match &loaded.source {
        SchemaSource::File(path) => {
            tracing::info!(schema_path = %path.display(), "using schema file");
        }
        SchemaSource::Default { path, reason } => {
            tracing::warn!(
                schema_path = %path.display(),
                %reason,
                "using built-in default schema"
            );
        }
    }
    let validator = Arc::new(Validator::new(loaded.schema));

    let app_state = AppState::new(
        clock,
        validator,
        event_store.clone(),
        config.events_limit,
    );
    let app = carehook_api::app(app_state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down appointment webhook service");
    event_store.close().await;

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
