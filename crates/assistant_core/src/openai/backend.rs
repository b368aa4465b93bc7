//! 上流AIサービスへのポート（`AiBackend`）と async-openai による実装。
//!
//! ハンドラやディスパッチャはこのトレイトだけに依存する。クライアントは
//! 起動時に一度だけ構築し、`Arc<dyn AiBackend>` として注入する。

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    AssistantStreamEvent,
    ChatCompletionRequestMessage,
    ChatCompletionTool,
    ChatCompletionToolChoiceOption,
    CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
    CreateMessageRequestArgs,
    CreateRunRequestArgs,
    CreateThreadRequestArgs,
    MessageRole,
};
use async_openai::Client;
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::OpenAISettings;

/// 上流呼び出しのエラー
#[derive(Debug, Error)]
pub enum AiError {
    #[error("openai request failed: {0}")]
    OpenAI(#[from] OpenAIError),

    #[error("failed to convert upstream object: {0}")]
    Convert(#[from] serde_json::Error),
}

/// Run ストリームから取り出したイベント（テキスト抽出済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// `thread.message.delta` の差分テキスト
    MessageDelta(String),
    /// `thread.message.completed` の全文
    MessageCompleted(String),
    /// それ以外のイベント（run 状態遷移など）
    Other,
}

pub type RunEventStream = BoxStream<'static, Result<RunEvent, AiError>>;

/// モデルが要求したツール呼び出し1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON文字列のまま（パースはリゾルバ側）
    pub arguments: String,
}

/// チャット呼び出しの入力（モデル名やトークン上限はバックエンド側の設定で補う）
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatCompletionRequestMessage>,
    pub tools: Vec<ChatCompletionTool>,
}

/// チャット呼び出しの結果
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    /// 上流レスポンスそのもの（呼び出し元へそのまま返す）
    pub raw: Value,
}

impl ChatReply {
    pub fn from_response(resp: CreateChatCompletionResponse) -> Result<Self, AiError> {
        let raw = serde_json::to_value(&resp)?;
        let message = resp.choices.into_iter().next().map(|c| c.message);
        let (content, tool_calls) = match message {
            Some(m) => {
                let calls = m
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tc| ToolCallRequest {
                        id: tc.id,
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    })
                    .collect();
                (m.content, calls)
            }
            None => (None, Vec::new()),
        };
        Ok(Self { content, tool_calls, raw })
    }
}

#[async_trait]
pub trait AiBackend: Send + Sync {
    /// アシスタント一覧（上流オブジェクトをJSON化したもの）
    async fn list_assistants(&self, limit: u32) -> Result<Vec<Value>, AiError>;

    /// スレッド作成
    async fn create_thread(&self) -> Result<Value, AiError>;

    /// スレッドへユーザーメッセージを追加
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), AiError>;

    /// Run をストリーミングで開始
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream, AiError>;

    /// ツール付きチャット補完
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, AiError>;
}

/// トークン制限戦略を表現する列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenLimitStrategy {
    /// `max_tokens` を使用（4oモデル向け）
    MaxTokens,
    /// `max_completion_tokens` を使用（それ以外）
    MaxCompletionTokens,
}

fn determine_token_limit_strategy(model: &str) -> TokenLimitStrategy {
    if model.contains("4o") {
        TokenLimitStrategy::MaxTokens
    } else {
        TokenLimitStrategy::MaxCompletionTokens
    }
}

/// async-openai クライアントを使った `AiBackend` 実装
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    settings: OpenAISettings,
}

impl OpenAiBackend {
    pub fn new(settings: &OpenAISettings) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(settings.api_key.clone());
        if let Some(base) = &settings.api_base {
            config = config.with_api_base(base.clone());
        }
        Self {
            client: Client::with_config(config),
            settings: settings.clone(),
        }
    }

    #[allow(deprecated)] // max_tokens は 4o 系でまだ必要
    fn build_chat_request(&self, request: ChatRequest) -> Result<CreateChatCompletionRequest, AiError> {
        let strategy = determine_token_limit_strategy(&self.settings.model);
        debug!(target: "openai", model = %self.settings.model, ?strategy, "token_limit_strategy");

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.settings.model.clone()).messages(request.messages);
        // 空の tools と tool_choice を同時に送ると上流が拒否する
        if !request.tools.is_empty() {
            builder.tools(request.tools).tool_choice(ChatCompletionToolChoiceOption::Auto);
        }
        match strategy {
            TokenLimitStrategy::MaxTokens => builder.max_tokens(self.settings.max_tokens),
            TokenLimitStrategy::MaxCompletionTokens => {
                builder.max_completion_tokens(self.settings.max_completion_tokens)
            }
        };
        Ok(builder.build()?)
    }
}

#[async_trait]
impl AiBackend for OpenAiBackend {
    #[instrument(name = "list_assistants", skip(self))]
    async fn list_assistants(&self, limit: u32) -> Result<Vec<Value>, AiError> {
        let limit = limit.to_string();
        let resp = self
            .client
            .assistants()
            .list(&[("limit", limit.as_str())])
            .await?;
        debug!(target: "openai", count = resp.data.len(), "assistants_listed");
        resp.data
            .iter()
            .map(|a| serde_json::to_value(a).map_err(AiError::from))
            .collect()
    }

    #[instrument(name = "create_thread", skip(self))]
    async fn create_thread(&self) -> Result<Value, AiError> {
        let request = CreateThreadRequestArgs::default().build()?;
        let thread = self.client.threads().create(request).await?;
        info!(target: "openai", thread_id = %thread.id, "thread_created");
        Ok(serde_json::to_value(&thread)?)
    }

    #[instrument(name = "add_user_message", skip(self, content), fields(content_len = content.len()))]
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), AiError> {
        let request = CreateMessageRequestArgs::default()
            .role(MessageRole::User)
            .content(content.to_string())
            .build()?;
        let message = self.client.threads().messages(thread_id).create(request).await?;
        debug!(target: "openai", message_id = %message.id, "message_appended");
        Ok(())
    }

    #[instrument(name = "stream_run", skip(self))]
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream, AiError> {
        let request = CreateRunRequestArgs::default()
            .assistant_id(assistant_id)
            .stream(true)
            .build()?;
        let upstream = self.client.threads().runs(thread_id).create_stream(request).await?;
        info!(target: "openai", "run_stream_opened");
        let events = upstream.map(|item| match item {
            Ok(event) => Ok(run_event_from_upstream(event)),
            Err(e) => Err(AiError::from(e)),
        });
        Ok(Box::pin(events))
    }

    #[instrument(name = "chat", skip(self, request), fields(messages = request.messages.len(), tools = request.tools.len()))]
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, AiError> {
        let req = self.build_chat_request(request)?;
        info!(target: "openai", model = %self.settings.model, "chat_request");
        let resp = self.client.chat().create(req).await?;
        debug!(target: "openai", choices = resp.choices.len(), "chat_response");
        ChatReply::from_response(resp)
    }
}

fn run_event_from_upstream(event: AssistantStreamEvent) -> RunEvent {
    match event {
        AssistantStreamEvent::ThreadMessageDelta(delta) => match serde_json::to_value(&delta) {
            Ok(v) => RunEvent::MessageDelta(delta_text(&v)),
            Err(e) => {
                warn!(target: "openai", error = %e, "message delta could not be converted");
                RunEvent::Other
            }
        },
        AssistantStreamEvent::ThreadMessageCompleted(message) => match serde_json::to_value(&message) {
            Ok(v) => RunEvent::MessageCompleted(message_text(&v)),
            Err(e) => {
                warn!(target: "openai", error = %e, "completed message could not be converted");
                RunEvent::Other
            }
        },
        _ => RunEvent::Other,
    }
}

/// `thread.message.delta` のJSONから text 部分を連結する
pub fn delta_text(delta: &Value) -> String {
    collect_text_values(&delta["delta"]["content"])
}

/// `thread.message` のJSONから text 部分を連結する
pub fn message_text(message: &Value) -> String {
    collect_text_values(&message["content"])
}

fn collect_text_values(content: &Value) -> String {
    content
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| p["type"] == "text")
                .filter_map(|p| p["text"]["value"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
