//! assistant_web
//!
//! `assistant_core` のサービスを HTTP ルートとして公開する axum アプリ。

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
