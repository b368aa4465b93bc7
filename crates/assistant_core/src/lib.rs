//! assistant_core
//!
//! OpenAI Assistants API 連携、ツール呼び出し、外部キャラクターAPIクライアントなど
//! Web層から独立した共通ロジックを提供するコアクレート。

pub mod characters;
pub mod config;
pub mod openai;
pub mod services;

// 主要な型を再エクスポート
pub use characters::{CharacterClient, CharacterError};
pub use config::{AppConfig, StreamEventKind};
pub use openai::{AiBackend, AiError, OpenAiBackend};
pub use services::AssistantService;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}
