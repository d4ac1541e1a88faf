use anyhow::{Context, Result};
use credregen_regenerator::{RegeneratorApp, RegeneratorConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = RegeneratorConfig::load().context("Failed to load regenerator configuration")?;
    let app = RegeneratorApp::from_config(config).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    // Serve regeneration requests until shutdown
    let handler = app.handler();
    let mut web_handle = tokio::spawn(async move {
        if let Err(e) = credregen_web::start(handler, shutdown_rx).await {
            error!(error = ?e, "Web service failed");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            app.shutdown();
            shutdown_tx.send(()).ok();
            if let Err(e) = web_handle.await {
                error!(error = ?e, "Web service task failed");
            }
        }
        _ = &mut web_handle => {
            info!("Web service completed");
            app.shutdown();
        }
    }

    Ok(())
}
