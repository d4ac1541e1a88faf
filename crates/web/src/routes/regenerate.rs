use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use credregen_common::{CredentialView, RegenerateHandler};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default)]
    name: Option<String>,
}

#[instrument(skip_all)]
pub async fn regenerate_handler<H: RegenerateHandler>(
    State(AppState { handler }): State<AppState<H>>,
    payload: Result<Json<RegenerateRequest>, JsonRejection>,
) -> Result<Json<CredentialView>, ApiError> {
    let Json(request) = payload?;
    let name = match request.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(ApiError::BadRequest(
                "The request does not include a valid name.".to_string(),
            ));
        }
    };

    info!(credential = %name, "Handling regenerate request");
    let view = handler.handle_regenerate(&name).await?;
    Ok(Json(view))
}
