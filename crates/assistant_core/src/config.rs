//! アプリケーション設定
//!
//! すべての値は環境変数（`.env` 可）から起動時に一度だけ読み込む。
//! APIキーなどの秘密情報をソースに埋め込まないこと。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// ストリーミングを有効化するフラグの値（完全一致のみ有効）
pub const ONLINE_FLAG_VALUE: &str = "True";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_CHARACTER_API_URL: &str = "http://localhost:8080/api/characters";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// ストリーミング中継でクライアントへ転送するイベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamEventKind {
    /// `thread.message.delta` の差分テキストを逐次転送
    #[default]
    Delta,
    /// `thread.message.completed` の完成メッセージを転送
    Completed,
}

impl FromStr for StreamEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delta" => Ok(Self::Delta),
            "completed" => Ok(Self::Completed),
            other => Err(format!("expected `delta` or `completed`, got `{other}`")),
        }
    }
}

impl fmt::Display for StreamEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delta => f.write_str("delta"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// OpenAI API 関連設定
#[derive(Clone)]
pub struct OpenAISettings {
    pub api_key: String,
    /// ベースURLの上書き（未設定ならクライアント既定）
    pub api_base: Option<String>,
    /// ツール呼び出しで使うチャットモデル名
    pub model: String,
    /// 4o系モデル向けの最大トークン数
    pub max_tokens: u32,
    /// それ以外のモデル向けの最大トークン数
    pub max_completion_tokens: u32,
    /// Run を実行するアシスタントID
    pub assistant_id: Option<String>,
    pub assistant_list_limit: u32,
}

// api_key をログに出さない
impl fmt::Debug for OpenAISettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAISettings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("max_completion_tokens", &self.max_completion_tokens)
            .field("assistant_id", &self.assistant_id)
            .field("assistant_list_limit", &self.assistant_list_limit)
            .finish()
    }
}

/// 外部キャラクターAPI 設定
#[derive(Debug, Clone)]
pub struct CharacterApiSettings {
    /// コレクションURL（GETで一覧、POSTで作成）
    pub url: String,
    pub timeout: Duration,
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAISettings,
    pub characters: CharacterApiSettings,
    /// `ASSISTANT_ONLINE` が "True" のときのみ true
    pub online: bool,
    pub stream_event_kind: StreamEventKind,
    pub bind_addr: String,
    /// 空なら全オリジン許可
    pub cors_origins: Vec<String>,
    pub log_dir: String,
}

impl AppConfig {
    /// プロセス環境変数から読み込む（`.env` は呼び出し側で事前にロードしておく）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から読み込む。テストでは環境変数を書き換えずに済む。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let openai = OpenAISettings {
            api_key,
            api_base: get("OPENAI_API_BASE"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or("OPENAI_MAX_TOKENS", get("OPENAI_MAX_TOKENS"), 2000)?,
            max_completion_tokens: parse_or(
                "OPENAI_MAX_COMPLETION_TOKENS",
                get("OPENAI_MAX_COMPLETION_TOKENS"),
                2000,
            )?,
            assistant_id: get("ASSISTANT_ID"),
            assistant_list_limit: parse_or("ASSISTANT_LIST_LIMIT", get("ASSISTANT_LIST_LIMIT"), 20)?,
        };

        let timeout_secs: u64 = parse_or(
            "CHARACTER_API_TIMEOUT_SECS",
            get("CHARACTER_API_TIMEOUT_SECS"),
            15,
        )?;
        let characters = CharacterApiSettings {
            url: get("CHARACTER_API_URL").unwrap_or_else(|| DEFAULT_CHARACTER_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        // 空白を含めた完全一致のみ。"true" や "1" はオフライン扱い
        let online = lookup("ASSISTANT_ONLINE").as_deref() == Some(ONLINE_FLAG_VALUE);

        let stream_event_kind = match get("STREAM_EVENT_KIND") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "STREAM_EVENT_KIND",
                value: raw.clone(),
                reason,
            })?,
            None => StreamEventKind::default(),
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            openai,
            characters,
            online,
            stream_event_kind,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_origins,
            log_dir: get("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
