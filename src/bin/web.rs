use clap::Parser;
use tracing_subscriber::EnvFilter;

use proton_beaker::config::Cli;
use proton_beaker::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = router(AppState::new(cli.sim_config(), cli.session_idle()));

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    tracing::info!("Serving on http://{}", cli.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
