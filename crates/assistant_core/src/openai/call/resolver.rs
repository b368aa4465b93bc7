use serde_json::Value;

use crate::openai::backend::ToolCallRequest;
use crate::openai::tools::{Tool, ToolContext};

use super::types::ToolResolution;

/// Resolve the requested tool by exact name, parse its arguments and execute it.
/// Never panics; every failure mode is reported as a `ToolResolution` variant.
pub async fn resolve_and_execute_tool_call(call: &ToolCallRequest, ctx: &ToolContext) -> ToolResolution {
    let tool = match Tool::from_name(&call.name) {
        Ok(t) => t,
        Err(_) => {
            return ToolResolution::ToolNotFound {
                call_id: call.id.clone(),
                requested: call.name.clone(),
            }
        }
    };

    // 引数なしのツールは空文字列で届くことがある
    let raw = if call.arguments.trim().is_empty() { "{}" } else { call.arguments.as_str() };
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            return ToolResolution::ArgumentsParseError {
                call_id: call.id.clone(),
                name: tool.name().to_string(),
                raw: call.arguments.clone(),
                error: e.to_string(),
            };
        }
    };

    match tool.invoke(&parsed, ctx).await {
        Ok(result) => ToolResolution::Executed {
            call_id: call.id.clone(),
            name: tool.name().to_string(),
            result,
        },
        Err(e) => ToolResolution::ExecutionError {
            call_id: call.id.clone(),
            name: tool.name().to_string(),
            error: e.to_string(),
        },
    }
}
