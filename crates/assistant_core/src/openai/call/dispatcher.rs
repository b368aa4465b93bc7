use tracing::{debug, info, instrument};

use crate::openai::backend::{AiBackend, AiError, ChatRequest};
use crate::openai::tools::{all_chat_tools, ToolContext};
use crate::openai::ConversationHistory;

use super::resolver::resolve_and_execute_tool_call;
use super::types::{ToolResolution, ToolTurn};

/// 2 ステップ function calling を1ターン実行する。
///
/// 1. ユーザーメッセージと全ツール定義でモデルを呼ぶ
/// 2. ツール呼び出しがなければその応答をそのまま返す
/// 3. 各ツール呼び出しを解決・実行し、call_id ごとに tool メッセージを積む
/// 4. 履歴全体でもう一度モデルを呼び、その応答をそのまま返す
///
/// リトライやタイムアウト制御はしない。上流エラーはそのまま返す。
#[instrument(name = "run_tool_turn", skip(backend, ctx, user_message), fields(message_len = user_message.len()))]
pub async fn run_tool_turn(
    backend: &dyn AiBackend,
    ctx: &ToolContext,
    user_message: &str,
) -> Result<ToolTurn, AiError> {
    let mut history = ConversationHistory::new();
    history.add_user(user_message)?;

    let first = backend
        .chat(ChatRequest {
            messages: history.as_slice().to_vec(),
            tools: all_chat_tools(),
        })
        .await?;

    if first.tool_calls.is_empty() {
        debug!(target: "openai", "model answered without tool calls");
        return Ok(ToolTurn { response: first.raw, resolutions: Vec::new() });
    }

    info!(target: "openai", calls = first.tool_calls.len(), "tool_calls_requested");
    history.add_assistant_tool_calls(&first.tool_calls)?;

    let mut resolutions: Vec<ToolResolution> = Vec::with_capacity(first.tool_calls.len());
    for call in &first.tool_calls {
        let resolution = resolve_and_execute_tool_call(call, ctx).await;
        debug!(target: "openai", resolution = %resolution, "tool_resolution");
        let result = resolution.to_call_result();
        history.add_tool_result(&result.call_id, &result.content)?;
        resolutions.push(resolution);
    }

    let second = backend
        .chat(ChatRequest {
            messages: history.into_vec(),
            tools: Vec::new(),
        })
        .await?;

    Ok(ToolTurn { response: second.raw, resolutions })
}
