use axum::routing::get;
use axum::Router;

use crate::WebState;

pub mod arrivals;

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/arrivals", get(arrivals::get_arrivals))
        .with_state(state)
}
