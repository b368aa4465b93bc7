//! 上流オブジェクトをクライアント向けJSONへ整形する。
//!
//! 宣言したフィールドは上流で欠けていても必ず出力する。任意のサブ構造
//! （code_interpreter のリソースなど）は空の構造で埋める。

use serde::Serialize;
use serde_json::{json, Map, Value};

/// アシスタント記述子
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantDescriptor {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub model: String,
    pub instructions: Option<String>,
    pub tools: Vec<Value>,
    pub tool_resources: Value,
    pub metadata: Value,
    pub response_format: Value,
    pub temperature: f64,
    pub top_p: f64,
}

/// スレッド記述子
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadDescriptor {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub metadata: Value,
    pub tool_resources: Value,
}

pub fn shape_assistant(raw: &Value) -> AssistantDescriptor {
    AssistantDescriptor {
        id: str_or(raw, "id", ""),
        object: str_or(raw, "object", "assistant"),
        created_at: raw["created_at"].as_i64().unwrap_or_default(),
        name: opt_str(raw, "name"),
        description: opt_str(raw, "description"),
        model: str_or(raw, "model", ""),
        instructions: opt_str(raw, "instructions"),
        tools: raw["tools"].as_array().cloned().unwrap_or_default(),
        tool_resources: assistant_tool_resources(&raw["tool_resources"]),
        metadata: object_or_empty(&raw["metadata"]),
        response_format: match &raw["response_format"] {
            Value::Null => Value::String("auto".to_string()),
            other => other.clone(),
        },
        temperature: raw["temperature"].as_f64().unwrap_or(1.0),
        top_p: raw["top_p"].as_f64().unwrap_or(1.0),
    }
}

pub fn shape_thread(raw: &Value) -> ThreadDescriptor {
    ThreadDescriptor {
        id: str_or(raw, "id", ""),
        object: str_or(raw, "object", "thread"),
        created_at: raw["created_at"].as_i64().unwrap_or_default(),
        metadata: object_or_empty(&raw["metadata"]),
        tool_resources: object_or_empty(&raw["tool_resources"]),
    }
}

/// code_interpreter / file_search は常に出す
fn assistant_tool_resources(raw: &Value) -> Value {
    let file_ids = raw["code_interpreter"]["file_ids"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let vector_store_ids = raw["file_search"]["vector_store_ids"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    json!({
        "code_interpreter": { "file_ids": file_ids },
        "file_search": { "vector_store_ids": vector_store_ids },
    })
}

fn object_or_empty(v: &Value) -> Value {
    match v {
        Value::Object(_) => v.clone(),
        _ => Value::Object(Map::new()),
    }
}

fn str_or(raw: &Value, key: &str, default: &str) -> String {
    raw[key].as_str().unwrap_or(default).to_string()
}

fn opt_str(raw: &Value, key: &str) -> Option<String> {
    raw[key].as_str().map(str::to_string)
}
