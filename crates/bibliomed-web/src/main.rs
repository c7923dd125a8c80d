//! Bibliomed Web Server
//!
//! Run with: cargo run -p bibliomed-web

use bibliomed_config::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load()?;
    let addr = config.bind_addr()?;

    info!("Starting Bibliomed Web Server...");
    if config.auth.enabled {
        info!(user = %config.auth.username, "Login gate enabled");
    }

    let state = bibliomed_web::state::AppState::from_config(&config)?;
    let app = bibliomed_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
