//! OpenAI連携のモジュール（Assistants API / Chat Completions）

pub mod backend;
pub mod call;
pub mod history; // conversation history helper
pub mod relay;
pub mod shape;
pub mod tools;

// 代表的な公開APIを再エクスポート
pub use backend::{
    AiBackend,
    AiError,
    ChatReply,
    ChatRequest,
    OpenAiBackend,
    RunEvent,
    RunEventStream,
    ToolCallRequest,
};
pub use call::{run_tool_turn, ToolResolution, ToolTurn};
pub use history::ConversationHistory;
pub use relay::open_run_stream;
pub use shape::{shape_assistant, shape_thread, AssistantDescriptor, ThreadDescriptor};
pub use tools::{Tool, ToolContext, ToolError, ToolParametersBuilder};
