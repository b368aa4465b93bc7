use serde::{Deserialize, Serialize};

/// GET /api/data のレスポンス
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub name: &'static str,
    pub message: &'static str,
}

/// POST /api/run のリクエスト
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub thread_id: String,
    pub message: String,
}

/// POST /api/chat のリクエスト
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
