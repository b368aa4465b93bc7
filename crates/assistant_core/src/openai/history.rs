use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall,
    ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage,
    ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolType,
    FunctionCall,
};

use super::backend::ToolCallRequest;

/// Conversation history for one tool-dispatch turn.
/// Wraps a `Vec<ChatCompletionRequestMessage>`; push order == send order.
#[derive(Debug, Default, Clone)]
pub struct ConversationHistory {
    messages: Vec<ChatCompletionRequestMessage>,
}

impl ConversationHistory {
    /// Create empty history.
    pub fn new() -> Self { Self { messages: Vec::new() } }

    pub fn len(&self) -> usize { self.messages.len() }
    pub fn is_empty(&self) -> bool { self.messages.is_empty() }

    pub fn as_slice(&self) -> &[ChatCompletionRequestMessage] { &self.messages }

    /// Consume and return inner vector.
    pub fn into_vec(self) -> Vec<ChatCompletionRequestMessage> { self.messages }

    /// Add user message.
    pub fn add_user<S: AsRef<str>>(&mut self, content: S) -> Result<&mut Self, OpenAIError> {
        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(content.as_ref())
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }

    /// Add the assistant message that carried the model's tool calls.
    /// Must precede the matching tool messages.
    pub fn add_assistant_tool_calls(&mut self, calls: &[ToolCallRequest]) -> Result<&mut Self, OpenAIError> {
        let tool_calls: Vec<ChatCompletionMessageToolCall> = calls
            .iter()
            .map(|c| ChatCompletionMessageToolCall {
                id: c.id.clone(),
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                },
            })
            .collect();
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .tool_calls(tool_calls)
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }

    /// Add tool result answering `call_id`. Content is the serialized JSON result.
    pub fn add_tool_result<S: AsRef<str>>(&mut self, call_id: &str, content: S) -> Result<&mut Self, OpenAIError> {
        let msg = ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id)
            .content(content.as_ref())
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }
}
