use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::CharacterApiSettings;

/// キャラクターAPI 呼び出しの失敗理由。
/// ツール結果としては `isSuccess: false` に畳み込まれるが、ログでは区別できる。
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("character api request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("character api returned status {0}")]
    Status(u16),

    #[error("character api returned malformed payload: {0}")]
    Payload(String),

    #[error("character api reported isSuccess=false")]
    Rejected,
}

/// キャラクター1件（ライフサイクルは外部サービスが所有）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
}

/// 一覧APIのレスポンス形式
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPayload {
    is_success: bool,
    #[serde(default, alias = "data")]
    characters: Vec<Character>,
}

/// モデルへ返す簡略化された結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterEnvelope {
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

impl CharacterEnvelope {
    pub fn failure() -> Self {
        Self { is_success: false, names: None }
    }

    pub fn created() -> Self {
        Self { is_success: true, names: None }
    }

    pub fn names(names: Vec<String>) -> Self {
        Self { is_success: true, names: Some(names) }
    }
}

/// 外部キャラクターAPI クライアント。起動時に一度作って共有する。
#[derive(Debug, Clone)]
pub struct CharacterClient {
    http: Client,
    url: String,
}

impl CharacterClient {
    pub fn new(settings: &CharacterApiSettings) -> Result<Self, CharacterError> {
        let http = Client::builder()
            .user_agent(concat!("assistant_gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { http, url: settings.url.clone() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET: キャラクター名の一覧を取得（順序は外部ペイロードのまま）
    #[instrument(name = "characters_list", skip(self), fields(url = %self.url))]
    pub async fn list(&self) -> Result<Vec<String>, CharacterError> {
        let resp = self.http.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CharacterError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        debug!(target: "characters", status = %status, len = text.len(), "list_response_raw");
        let payload: ListPayload =
            serde_json::from_str(&text).map_err(|e| CharacterError::Payload(e.to_string()))?;
        if !payload.is_success {
            return Err(CharacterError::Rejected);
        }
        Ok(payload.characters.into_iter().map(|c| c.name).collect())
    }

    /// POST: キャラクターを作成。HTTP 200 のみ成功とみなす
    #[instrument(name = "characters_create", skip(self), fields(url = %self.url))]
    pub async fn create(&self, name: &str) -> Result<(), CharacterError> {
        let body = Character { name: name.to_string() };
        let resp = self.http.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        debug!(target: "characters", status = %status, "create_response");
        if status != StatusCode::OK {
            return Err(CharacterError::Status(status.as_u16()));
        }
        Ok(())
    }

    /// `list` の結果を `isSuccess` 形式に畳み込む
    pub async fn list_envelope(&self) -> CharacterEnvelope {
        match self.list().await {
            Ok(names) => CharacterEnvelope::names(names),
            Err(e) => {
                warn!(target: "characters", error = %e, "character list failed");
                CharacterEnvelope::failure()
            }
        }
    }

    /// `create` の結果を `isSuccess` 形式に畳み込む
    pub async fn create_envelope(&self, name: &str) -> CharacterEnvelope {
        match self.create(name).await {
            Ok(()) => CharacterEnvelope::created(),
            Err(e) => {
                warn!(target: "characters", error = %e, character = name, "character create failed");
                CharacterEnvelope::failure()
            }
        }
    }
}
