use std::sync::Arc;

use anyhow::{Context, Result};
use pdf_table_csv::{AppConfig, AppState, router};
use pdf_tables::TextLayoutExtractor;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting pdf-table-csv v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    config
        .ensure_directories()
        .context("failed to create upload/download directories")?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        intake = %config.storage.intake_dir.display(),
        output = %config.storage.output_dir.display(),
        policy = ?config.extraction.column_policy,
        "Configuration loaded"
    );

    let extractor = Arc::new(TextLayoutExtractor::new(config.extract_options()));
    let addr = config.server.bind_address();
    let app = router(AppState::new(config, extractor));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pdf_table_csv=info,pdf_tables=info,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
