use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_recommender::api::{create_router, AppState};
use course_recommender::config::Config;
use course_recommender::dataset;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("course_recommender=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initial training; a bad dataset stops startup
    let dataset = dataset::load_from_path(&config.dataset_path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", config.dataset_path, e))?;
    let state = AppState::from_config(&config, dataset)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to train models: {}", e))?;

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
