//! Arcadia payment API entry point

use arcadia::api::ApiServer;
use arcadia::config::AppConfig;
use arcadia::payment::provider::InMemoryProvider;
use arcadia::payment::service::OrderService;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "arcadia-api", about = "Payment API for the Arcadia wagering arcade")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcadia=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    info!("Configuration loaded");
    info!("   Currency: {}", config.provider.currency);
    info!("   Entry fee: {}", config.game.entry_fee);

    // The hosted provider SDK is deployment-specific; the in-memory
    // provider serves local runs and integration environments.
    let provider = Arc::new(InMemoryProvider::new());
    let orders = Arc::new(OrderService::new(provider, config.provider.key_secret.clone()));

    ApiServer::new(config.server, orders).run().await
}
