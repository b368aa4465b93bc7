use assistant_core::openai::ThreadDescriptor;
use axum::extract::State;
use axum::Json;

use crate::error::HttpError;
use crate::state::AppState;

/// POST /api/threads - スレッド作成
pub async fn create_thread(
    State(service): State<AppState>,
) -> Result<Json<ThreadDescriptor>, HttpError> {
    let thread = service.create_thread().await?;
    tracing::info!(target: "assistant_web::threads", thread_id = %thread.id, "thread created");
    Ok(Json(thread))
}
