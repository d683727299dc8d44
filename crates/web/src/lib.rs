use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};
use model::config::Config;
use serde_json::json;
use store::live::LiveData;
use store::static_data::StaticDataHandle;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;

/// Shared application state, cheap to clone (everything behind an `Arc`),
/// handed to every handler via axum's `FromRef`.
#[derive(Clone, FromRef)]
pub struct WebState {
    pub static_data: Arc<StaticDataHandle>,
    pub live: Arc<LiveData>,
    pub config: Arc<Config>,
    /// Flipped once after the first static load completes; `/health`
    /// reports it directly.
    pub ready: Arc<AtomicBool>,
}

pub async fn start_web_server(state: WebState) -> std::io::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let routes = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest_service("/api", api::routes(state))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("listening on {bind_addr}");
    axum::serve(listener, routes.into_make_service()).await
}

async fn health(State(state): State<WebState>) -> Json<serde_json::Value> {
    Json(json!({ "ready": state.ready.load(Ordering::Relaxed) }))
}
