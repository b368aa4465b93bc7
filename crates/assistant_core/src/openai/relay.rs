//! Run ストリームの中継
//!
//! ユーザーメッセージをスレッドへ追加してから Run を開始し、設定された種別の
//! イベントだけをテキスト断片として流す。終端マーカーは送らない。

use futures_util::future;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{debug, instrument, warn};

use crate::config::StreamEventKind;

use super::backend::{AiBackend, AiError, RunEvent, RunEventStream};

/// メッセージ追加 → Run 開始。返すストリームはテキスト断片のみ。
/// ストリームを drop すると上流接続も閉じる。
#[instrument(name = "open_run_stream", skip(backend, message), fields(message_len = message.len()))]
pub async fn open_run_stream(
    backend: &dyn AiBackend,
    thread_id: &str,
    message: &str,
    assistant_id: &str,
    kind: StreamEventKind,
) -> Result<BoxStream<'static, String>, AiError> {
    backend.add_user_message(thread_id, message).await?;
    let events = backend.stream_run(thread_id, assistant_id).await?;
    debug!(target: "openai", %kind, "relaying run events");
    Ok(relay_text(events, kind))
}

/// イベント列からテキスト断片だけを取り出す。上流エラーでストリームを終える。
pub fn relay_text(events: RunEventStream, kind: StreamEventKind) -> BoxStream<'static, String> {
    events
        .map(move |item| match item {
            Ok(event) => Some(select_text(event, kind)),
            Err(e) => {
                warn!(target: "openai", error = %e, "run stream failed; closing relay");
                None
            }
        })
        .take_while(|step| future::ready(step.is_some()))
        .filter_map(|step| future::ready(step.flatten().filter(|text| !text.is_empty())))
        .boxed()
}

fn select_text(event: RunEvent, kind: StreamEventKind) -> Option<String> {
    match (event, kind) {
        (RunEvent::MessageDelta(text), StreamEventKind::Delta) => Some(text),
        (RunEvent::MessageCompleted(text), StreamEventKind::Completed) => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::OpenAIError;
    use futures_util::stream;

    fn events(items: Vec<Result<RunEvent, AiError>>) -> RunEventStream {
        stream::iter(items).boxed()
    }

    fn sample() -> Vec<Result<RunEvent, AiError>> {
        vec![
            Ok(RunEvent::Other),
            Ok(RunEvent::MessageDelta("Hel".into())),
            Ok(RunEvent::MessageDelta(String::new())),
            Ok(RunEvent::MessageDelta("lo".into())),
            Ok(RunEvent::MessageCompleted("Hello".into())),
            Ok(RunEvent::Other),
        ]
    }

    #[tokio::test]
    async fn delta_kind_forwards_fragments_in_order() {
        let out: Vec<String> = relay_text(events(sample()), StreamEventKind::Delta).collect().await;
        assert_eq!(out, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn completed_kind_forwards_whole_messages() {
        let out: Vec<String> = relay_text(events(sample()), StreamEventKind::Completed).collect().await;
        assert_eq!(out, vec!["Hello"]);
    }

    #[tokio::test]
    async fn upstream_error_ends_the_relay() {
        let items = vec![
            Ok(RunEvent::MessageDelta("a".into())),
            Err(AiError::OpenAI(OpenAIError::InvalidArgument("broken".into()))),
            Ok(RunEvent::MessageDelta("b".into())),
        ];
        let out: Vec<String> = relay_text(events(items), StreamEventKind::Delta).collect().await;
        assert_eq!(out, vec!["a"]);
    }
}
