use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerInfo {
    app: AppInfo,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AppInfo {
    name: String,
    version: String,
}

#[instrument(skip_all)]
pub async fn info_handler() -> Json<ServerInfo> {
    info!("Handling server info request");
    Json(ServerInfo {
        app: AppInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}
