use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod ping;
pub mod search;

/// Routes with request tracing and panic recovery. A panicking handler
/// answers 500 instead of dropping the connection.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping::ping))
        .route("/api/search", get(search::search))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
