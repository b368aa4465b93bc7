use axum::Json;

use crate::models::DataResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to the assistant gateway!";

/// GET / - ウェルカムメッセージ
pub async fn home() -> &'static str {
    WELCOME_MESSAGE
}

/// GET /api/data - 固定JSON
pub async fn data() -> Json<DataResponse> {
    Json(DataResponse {
        name: "Azure",
        message: "Hello from Azure!",
    })
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
