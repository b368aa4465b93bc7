//! AssistantService
//!
//! ルートごとの処理をまとめたサービス層。上流クライアントとキャラクター
//! クライアントは起動時に一度だけ作り、ここへ注入する。

use std::sync::Arc;

use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::characters::{CharacterClient, CharacterError};
use crate::config::{AppConfig, StreamEventKind};
use crate::openai::{
    open_run_stream,
    run_tool_turn,
    shape_assistant,
    shape_thread,
    AiBackend,
    AiError,
    AssistantDescriptor,
    OpenAiBackend,
    ThreadDescriptor,
    ToolContext,
    ToolTurn,
};

/// Run 開始時のエラー
#[derive(Debug, Error)]
pub enum RunError {
    #[error("ASSISTANT_ID is not configured")]
    AssistantNotConfigured,

    #[error(transparent)]
    Upstream(#[from] AiError),
}

/// アシスタントサービス
#[derive(Clone)]
pub struct AssistantService {
    backend: Arc<dyn AiBackend>,
    tools: ToolContext,
    assistant_id: Option<String>,
    list_limit: u32,
    stream_event_kind: StreamEventKind,
    online: bool,
}

impl AssistantService {
    /// 依存を明示的に渡して作成（テストではフェイクの backend を渡す）
    pub fn new(backend: Arc<dyn AiBackend>, characters: CharacterClient, config: &AppConfig) -> Self {
        Self {
            backend,
            tools: ToolContext { characters },
            assistant_id: config.openai.assistant_id.clone(),
            list_limit: config.openai.assistant_list_limit,
            stream_event_kind: config.stream_event_kind,
            online: config.online,
        }
    }

    /// 設定から本番用の依存を組み立てる
    pub fn from_config(config: &AppConfig) -> Result<Self, CharacterError> {
        let backend: Arc<dyn AiBackend> = Arc::new(OpenAiBackend::new(&config.openai));
        let characters = CharacterClient::new(&config.characters)?;
        Ok(Self::new(backend, characters, config))
    }

    /// ストリーミングが有効か（`ASSISTANT_ONLINE=True`）
    pub fn is_online(&self) -> bool {
        self.online
    }

    pub async fn list_assistants(&self) -> Result<Vec<AssistantDescriptor>, AiError> {
        let raw = self.backend.list_assistants(self.list_limit).await?;
        tracing::info!(target: "assistant_service", count = raw.len(), "assistants listed");
        Ok(raw.iter().map(shape_assistant).collect())
    }

    pub async fn create_thread(&self) -> Result<ThreadDescriptor, AiError> {
        let raw = self.backend.create_thread().await?;
        Ok(shape_thread(&raw))
    }

    /// メッセージを追加して Run のテキスト断片ストリームを返す
    pub async fn open_run(&self, thread_id: &str, message: &str) -> Result<BoxStream<'static, String>, RunError> {
        let assistant_id = self.assistant_id.as_deref().ok_or(RunError::AssistantNotConfigured)?;
        let stream = open_run_stream(
            self.backend.as_ref(),
            thread_id,
            message,
            assistant_id,
            self.stream_event_kind,
        )
        .await?;
        Ok(stream)
    }

    /// ツール呼び出しを含む1ターンのチャット
    pub async fn chat(&self, message: &str) -> Result<ToolTurn, AiError> {
        let turn = run_tool_turn(self.backend.as_ref(), &self.tools, message).await?;
        tracing::info!(
            target: "assistant_service",
            tool_calls = turn.resolutions.len(),
            failed = turn.resolutions.iter().filter(|r| !r.is_executed()).count(),
            "chat turn finished"
        );
        Ok(turn)
    }
}
