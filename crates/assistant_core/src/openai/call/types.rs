use serde_json::{json, Value};
use std::fmt::{self, Display};

/// ツール呼び出し1件を解決・実行した結果
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResolution {
    /// ツールが存在し、引数JSONがパースされ、正常実行された
    Executed { call_id: String, name: String, result: Value },
    /// 登録されていないツール名
    ToolNotFound { call_id: String, requested: String },
    /// 引数JSONのパースに失敗
    ArgumentsParseError { call_id: String, name: String, raw: String, error: String },
    /// 実行中にエラー（引数の型不一致など）
    ExecutionError { call_id: String, name: String, error: String },
}

impl ToolResolution {
    /// 実行成功か判定用ヘルパ
    pub fn is_executed(&self) -> bool {
        matches!(self, ToolResolution::Executed { .. })
    }

    pub fn call_id(&self) -> &str {
        match self {
            ToolResolution::Executed { call_id, .. }
            | ToolResolution::ToolNotFound { call_id, .. }
            | ToolResolution::ArgumentsParseError { call_id, .. }
            | ToolResolution::ExecutionError { call_id, .. } => call_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolResolution::ToolNotFound { requested, .. } => requested,
            ToolResolution::Executed { name, .. }
            | ToolResolution::ArgumentsParseError { name, .. }
            | ToolResolution::ExecutionError { name, .. } => name,
        }
    }

    /// モデルへ返す tool メッセージを組み立てる。失敗時は `{"error": ...}` を返す
    pub fn to_call_result(&self) -> ToolCallResult {
        let content = match self {
            ToolResolution::Executed { result, .. } => result.to_string(),
            ToolResolution::ToolNotFound { requested, .. } => {
                json!({ "error": format!("unknown tool: {requested}") }).to_string()
            }
            ToolResolution::ArgumentsParseError { error, .. } => {
                json!({ "error": format!("arguments are not valid JSON: {error}") }).to_string()
            }
            ToolResolution::ExecutionError { error, .. } => json!({ "error": error }).to_string(),
        };
        ToolCallResult {
            name: self.name().to_string(),
            call_id: self.call_id().to_string(),
            content,
        }
    }
}

impl Display for ToolResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolResolution::Executed { call_id, name, result } => {
                write!(f, "Executed id={} name={} result={}", call_id, name, result)
            }
            ToolResolution::ToolNotFound { call_id, requested } => {
                write!(f, "ToolNotFound id={} requested={}", call_id, requested)
            }
            ToolResolution::ArgumentsParseError { call_id, name, raw, error } => {
                write!(f, "ArgumentsParseError id={} name={} error={} raw={}", call_id, name, error, raw)
            }
            ToolResolution::ExecutionError { call_id, name, error } => {
                write!(f, "ExecutionError id={} name={} error={}", call_id, name, error)
            }
        }
    }
}

/// 会話履歴に積むツール結果。`call_id` は応答対象の呼び出しを指す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallResult {
    pub name: String,
    pub call_id: String,
    /// シリアライズ済みJSON
    pub content: String,
}

/// ツール呼び出しターンの結果
#[derive(Debug, Clone)]
pub struct ToolTurn {
    /// 最終（2回目、またはツール不要なら1回目）のモデル応答そのもの
    pub response: Value,
    pub resolutions: Vec<ToolResolution>,
}
