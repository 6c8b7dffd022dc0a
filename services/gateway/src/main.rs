use anyhow::Context;
use gateway::{AppState, Config, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gateway=info,matching_engine=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        notify_eligible_providers = config.notify_eligible_providers,
        event_buffer = config.event_buffer,
        "Starting Gateway API service"
    );

    let state = AppState::new(&config);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
