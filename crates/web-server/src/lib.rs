use anyhow::Context;
use configuration::Settings;
use contact_service::ContactService;
use database::{ensure_schema, PgContactStore};
use std::net::SocketAddr;
use std::sync::Arc;
// Note: Tracing is handled by the binary that calls `run_server`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use routes::router;
pub use telemetry::init_tracing;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub service: ContactService,
}

impl AppState {
    pub fn new(service: ContactService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// The main function to configure and run the web server.
///
/// Connects to PostgreSQL, makes sure the contacts table exists, then serves
/// until Ctrl-C.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    let store = PgContactStore::new(db_pool.clone(), &settings.database.table)?;
    ensure_schema(store.pool(), store.statements())
        .await
        .context("Failed to prepare the contacts table")?;

    let service = ContactService::new(Arc::new(store));
    let app = router(AppState::new(service), settings.server.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", settings.server.host, settings.server.port)
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
