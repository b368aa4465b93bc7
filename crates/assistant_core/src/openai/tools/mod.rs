//! Tools module aggregator.
//!
//! モデルが呼び出せる関数は `Tool` の閉じた列挙で表す。未登録の名前は
//! `ToolError::Unknown` として明示的に扱う。

mod schema; // parameter schema builder
mod weather;

pub use schema::{ToolParameters, ToolParametersBuilder};
pub use weather::{get_current_weather, WeatherReport, DEFAULT_UNIT};

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::characters::CharacterClient;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    Unknown(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    #[error("failed to serialize tool result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ツール実行時に参照する依存（起動時に構築したものを共有）
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub characters: CharacterClient,
}

/// モデルが呼び出せるツール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetCurrentWeather,
    GetCharacterNames,
    CreateCharacter,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::GetCurrentWeather, Tool::GetCharacterNames, Tool::CreateCharacter];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::GetCurrentWeather => "get_current_weather",
            Tool::GetCharacterNames => "get_character_names",
            Tool::CreateCharacter => "create_character",
        }
    }

    /// 完全一致で解決する
    pub fn from_name(name: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::GetCurrentWeather => "Get the current weather in a given location",
            Tool::GetCharacterNames => "Get the names of all registered characters",
            Tool::CreateCharacter => "Create a new character with the given name",
        }
    }

    pub fn parameters(&self) -> ToolParameters {
        match self {
            Tool::GetCurrentWeather => ToolParametersBuilder::new_object()
                .add_string("location", Some("The city and state, e.g. San Francisco, CA"))
                .add_string_enum("unit", None, &["celsius", "fahrenheit"])
                .required("location")
                .build(),
            Tool::GetCharacterNames => ToolParametersBuilder::new_object().build(),
            Tool::CreateCharacter => ToolParametersBuilder::new_object()
                .add_string("name", Some("Name of the character to create"))
                .required("name")
                .additional_properties(false)
                .build(),
        }
    }

    /// OpenAI SDK の `ChatCompletionTool` に変換
    pub fn as_chat_tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name().to_string(),
                description: Some(self.description().to_string()),
                parameters: Some(self.parameters().into_value()),
                strict: None,
            },
        }
    }

    /// ツールを実行して結果JSONを返す
    #[instrument(name = "tool_invoke", skip(self, args, ctx), fields(tool = self.name()))]
    pub async fn invoke(&self, args: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let result = match self {
            Tool::GetCurrentWeather => {
                let location = required_str(self.name(), args, "location")?;
                let unit = args.get("unit").and_then(Value::as_str).unwrap_or(DEFAULT_UNIT);
                serde_json::to_value(get_current_weather(location, unit))?
            }
            Tool::GetCharacterNames => serde_json::to_value(ctx.characters.list_envelope().await)?,
            Tool::CreateCharacter => {
                let name = required_str(self.name(), args, "name")?;
                serde_json::to_value(ctx.characters.create_envelope(name).await)?
            }
        };
        debug!(target: "openai", result = %result, "tool_result");
        Ok(result)
    }
}

/// 全ツールの API 定義
pub fn all_chat_tools() -> Vec<ChatCompletionTool> {
    Tool::ALL.iter().map(Tool::as_chat_tool).collect()
}

fn required_str<'a>(tool: &'static str, args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments {
            tool,
            reason: format!("missing or non-string '{key}'"),
        })
}
