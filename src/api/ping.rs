use axum::Json;

use crate::models::PingResponse;

/// GET /ping - Liveness check
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "pong" })
}
