use axum::Json;

use crate::api::dto::HealthResponse;

pub(crate) async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "ExpenseBuddy API is running".to_string(),
    })
}
