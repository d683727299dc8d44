use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::WebState;

pub mod v1;

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest_service("/v1", v1::routes(state.clone()))
        .with_state(state)
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong!" }))
}
