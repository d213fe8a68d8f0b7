use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transito_core::loading::{TransitModelConfig, create_transit_model};
use transito_server::{AppState, ServerConfig, create_router, ticker::run_simulation};

#[derive(Debug, Parser)]
#[command(version, about = "Monterrey transit planner and vehicle tracking server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration
    #[arg(short, long)]
    listen: Option<String>,
    /// Reference data JSON file, overrides the configuration
    #[arg(long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(data) = args.data {
        config.data_path = Some(data);
    }

    let model = create_transit_model(&TransitModelConfig {
        data_path: config.data_path.clone(),
    })?;
    let state = AppState::new(model, config);
    if state.config.seed_demo_vehicles {
        state.seed_demo_vehicles().await;
    }

    let ticker = tokio::spawn(run_simulation(
        Arc::clone(&state.simulator),
        state.config.tick_interval(),
    ));

    let listener = TcpListener::bind(&state.config.listen).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
