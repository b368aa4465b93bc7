use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::HttpError;
use crate::models::ChatRequest;
use crate::state::AppState;

/// POST /api/chat - ツール呼び出しを含む1ターンを実行し、最終応答をそのまま返す
pub async fn chat_api(
    State(service): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, HttpError> {
    tracing::info!(target: "assistant_web::chat", message_len = req.message.len(), "Received chat request");
    let turn = service.chat(&req.message).await?;
    for resolution in &turn.resolutions {
        tracing::debug!(target: "assistant_web::chat", resolution = %resolution, "tool call");
    }
    Ok(Json(turn.response))
}
