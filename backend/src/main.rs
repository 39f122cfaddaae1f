use spin_backend::config::AppConfig;
use spin_backend::{create_app, logging, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_path(".env").ok();
    logging::setup();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr;
    let state = AppState::from_config(config)?;
    state.spawn_session_sweeper();
    let app = create_app(state);

    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
