use anyhow::{Context, Result};
use axum::Router;
use credregen_common::RegenerateHandler;
use tokio::{net::TcpListener, sync::broadcast::Receiver};
use tracing::{error, info, instrument, trace};

mod error;
mod routes;
mod web_config;

pub use web_config::WebConfig;

#[derive(Clone)]
pub(crate) struct AppState<H: RegenerateHandler> {
    handler: H,
}

/// HTTP API over `handler`
pub fn router<H: RegenerateHandler>(handler: H) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .with_state(AppState { handler })
}

#[instrument(skip_all, name = "start_web")]
pub async fn start<H: RegenerateHandler>(
    handler: H,
    mut shutdown_signal: Receiver<()>,
) -> Result<()> {
    trace!("Starting web server");

    let config = match WebConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid web configuration");
            anyhow::bail!("Invalid web configuration: {}", e);
        }
    };
    info!("Starting web server with configuration: {:?}", config);

    let app = router(handler);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Socket binding failed")?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown_signal.recv().await;
            info!("Shutdown signal received, stopping web server");
        })
        .await
        .context("Server failed")?;

    Ok(())
}
