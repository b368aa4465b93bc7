//! 外部キャラクターAPI（一覧・作成）のクライアント

mod client;

pub use client::{Character, CharacterClient, CharacterError, CharacterEnvelope};
