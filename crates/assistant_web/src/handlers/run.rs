use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;

use crate::error::HttpError;
use crate::models::RunRequest;
use crate::state::AppState;

pub const OFFLINE_MESSAGE: &str = "Currently offline!";

/// POST /api/run - メッセージを追加して Run の出力を SSE で中継
///
/// `ASSISTANT_ONLINE` が "True" でなければ固定テキストを返す。
/// クライアントが切断するとストリームが drop され、上流接続も閉じる。
pub async fn run_api(
    State(service): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Response, HttpError> {
    if !service.is_online() {
        tracing::info!(target: "assistant_web::run", "run requested while offline");
        return Ok(OFFLINE_MESSAGE.into_response());
    }

    tracing::info!(target: "assistant_web::run", thread_id = %req.thread_id, "starting run stream");
    let tokens = service.open_run(&req.thread_id, &req.message).await?;
    let events = tokens.map(|token| Ok::<_, Infallible>(Event::default().data(normalize_line_breaks(&token))));
    Ok(Sse::new(events).into_response())
}

/// SSE のフィールド値は CR を含められないので、改行を LF に揃える。
/// LF は `Event::data` が複数の `data:` 行に分割する。
fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
