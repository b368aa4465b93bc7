// Submodule for tool-calling features: types, resolver, and the dispatch turn.

pub mod dispatcher;
pub mod resolver;
pub mod types;

pub use dispatcher::run_tool_turn;
pub use resolver::resolve_and_execute_tool_call;
pub use types::{ToolCallResult, ToolResolution, ToolTurn};
