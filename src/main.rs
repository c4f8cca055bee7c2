use std::sync::Arc;

use drama_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::providers::{DatasetSource, FileSource, HttpSource},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let source: Arc<dyn DatasetSource> = match &config.dataset_path {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(HttpSource::new(config.dataset_url.clone())),
    };

    // Initialize application state and load the corpus before serving
    let state = AppState::new(config.engine()).with_source(source.clone());
    state.service.load_from(source.as_ref()).await?;

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
