use axum::{
    Router,
    routing::{get, post},
};
use credregen_common::RegenerateHandler;

use crate::AppState;

mod bulk_regenerate;
mod info;
mod regenerate;

pub fn api_routes<H: RegenerateHandler>() -> Router<AppState<H>> {
    Router::new()
        .route("/info", get(info::info_handler))
        .route("/api/v1/regenerate", post(regenerate::regenerate_handler::<H>))
        .route(
            "/api/v1/bulk-regenerate",
            post(bulk_regenerate::bulk_regenerate_handler::<H>),
        )
}
