use assistant_core::openai::AssistantDescriptor;
use axum::extract::State;
use axum::Json;

use crate::error::HttpError;
use crate::state::AppState;

/// GET /api/assistants - アシスタント一覧
pub async fn list_assistants(
    State(service): State<AppState>,
) -> Result<Json<Vec<AssistantDescriptor>>, HttpError> {
    let assistants = service.list_assistants().await?;
    tracing::debug!(target: "assistant_web::assistants", count = assistants.len(), "assistants returned");
    Ok(Json(assistants))
}
