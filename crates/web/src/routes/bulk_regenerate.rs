use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use credregen_common::{BulkRegenerateResults, RegenerateHandler};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkRegenerateRequest {
    #[serde(default)]
    signed_by: Option<String>,
}

#[instrument(skip_all)]
pub async fn bulk_regenerate_handler<H: RegenerateHandler>(
    State(AppState { handler }): State<AppState<H>>,
    payload: Result<Json<BulkRegenerateRequest>, JsonRejection>,
) -> Result<Json<BulkRegenerateResults>, ApiError> {
    let Json(request) = payload?;
    let signer = match request.signed_by.as_deref().map(str::trim) {
        Some(signer) if !signer.is_empty() => signer.to_string(),
        _ => {
            return Err(ApiError::BadRequest(
                "The request does not include a valid signed_by.".to_string(),
            ));
        }
    };

    info!(signer = %signer, "Handling bulk regenerate request");
    let results = handler.handle_bulk_regenerate(&signer).await?;
    info!(
        regenerated = results.regenerated_credentials.len(),
        failed = results.failed_credentials.len(),
        "Bulk regenerate request complete"
    );
    Ok(Json(results))
}
