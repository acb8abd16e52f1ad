use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use std::sync::Arc;
use student_records::{
    api::{self, AppState},
    config, logging,
    store::RecordStore,
    summarization::{OllamaChatClient, SummaryGateway},
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "student-records",
    about = "In-memory student records service with AI summaries"
)]
struct Cli {
    /// Listen port; overrides the `PORT` environment variable.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing();
    let config = config::init_config().context("failed to load configuration")?;

    let store = Arc::new(RecordStore::new());
    let client = OllamaChatClient::from_config(config)
        .context("failed to build summary client")?;
    let gateway = Arc::new(SummaryGateway::new(store.clone(), Arc::new(client)));
    let app = api::create_router(AppState::new(store, gateway));

    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(
        port,
        ollama_url = %config.ollama_url,
        model = %config.summary_model,
        "Server running at http://localhost:{port}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
