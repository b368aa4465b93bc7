use std::sync::Arc;

use assistant_core::{AppConfig, AssistantService};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // エラーハンドリングの初期化
    color_eyre::install()?;

    // 環境変数のロード（.env がなければ無視）
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().wrap_err("loading configuration")?;

    // ログ: 標準出力 + 日次ローテーションのファイル
    let file_appender = rolling::daily(&config.log_dir, "assistant_web.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,assistant_web=debug,tower_http=debug"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    tracing::info!(
        target: "assistant_web",
        online = config.online,
        stream_event_kind = %config.stream_event_kind,
        assistant_configured = config.openai.assistant_id.is_some(),
        "Starting web server..."
    );

    // クライアントは起動時に一度だけ作り、状態として注入する
    let service = AssistantService::from_config(&config).wrap_err("building character api client")?;
    let app = assistant_web::create_router(Arc::new(service), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .wrap_err_with(|| format!("binding {}", config.bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(target: "assistant_web", "Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: "assistant_web", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "assistant_web", error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
