use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assistant_core::characters::CharacterClient;
use assistant_core::config::CharacterApiSettings;
use assistant_core::openai::{
    run_tool_turn, AiBackend, AiError, ChatReply, ChatRequest, RunEventStream, ToolCallRequest,
    ToolContext, ToolResolution,
};
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

mod common;

#[ctor::ctor]
fn _init() { common::init(); }

/// Chat だけを実装したフェイク。受け取ったリクエストを記録し、用意した応答を順に返す
#[derive(Default)]
struct ScriptedChat {
    replies: Mutex<VecDeque<ChatReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    fn new(replies: Vec<ChatReply>) -> Self {
        Self { replies: Mutex::new(replies.into()), requests: Mutex::default() }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiBackend for ScriptedChat {
    async fn list_assistants(&self, _limit: u32) -> Result<Vec<Value>, AiError> {
        unimplemented!("not used by tool turns")
    }

    async fn create_thread(&self) -> Result<Value, AiError> {
        unimplemented!("not used by tool turns")
    }

    async fn add_user_message(&self, _thread_id: &str, _content: &str) -> Result<(), AiError> {
        unimplemented!("not used by tool turns")
    }

    async fn stream_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<RunEventStream, AiError> {
        unimplemented!("not used by tool turns")
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, AiError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.replies.lock().unwrap().pop_front().expect("scripted reply"))
    }
}

fn tool_call_reply(calls: Vec<ToolCallRequest>) -> ChatReply {
    ChatReply { content: None, tool_calls: calls, raw: json!({ "id": "chatcmpl-1" }) }
}

fn text_reply(id: &str, text: &str) -> ChatReply {
    ChatReply {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
        raw: json!({
            "id": id,
            "object": "chat.completion",
            "choices": [ { "index": 0, "message": { "role": "assistant", "content": text } } ]
        }),
    }
}

fn call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest { id: id.into(), name: name.into(), arguments: arguments.into() }
}

fn offline_ctx() -> ToolContext {
    let settings = CharacterApiSettings {
        url: "http://127.0.0.1:9/characters".into(),
        timeout: Duration::from_millis(200),
    };
    ToolContext { characters: CharacterClient::new(&settings).unwrap() }
}

fn tool_message(msg: &ChatCompletionRequestMessage) -> Option<(String, Value)> {
    match msg {
        ChatCompletionRequestMessage::Tool(t) => {
            let v = serde_json::to_value(t).unwrap();
            let content: Value = serde_json::from_str(v["content"].as_str().unwrap()).unwrap();
            Some((t.tool_call_id.clone(), content))
        }
        _ => None,
    }
}

#[tokio::test]
async fn text_answer_skips_follow_up_call() {
    let backend = ScriptedChat::new(vec![text_reply("chatcmpl-a", "Hello!")]);
    let turn = run_tool_turn(&backend, &offline_ctx(), "hi").await.unwrap();

    assert_eq!(turn.response["id"], "chatcmpl-a");
    assert!(turn.resolutions.is_empty());
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tools.len(), 3);
}

#[tokio::test]
async fn weather_calls_are_answered_by_call_id_and_follow_up_is_returned() {
    let backend = ScriptedChat::new(vec![
        tool_call_reply(vec![
            call("call_tokyo", "get_current_weather", r#"{"location":"Tokyo","unit":"celsius"}"#),
            call("call_mars", "get_current_weather", r#"{"location":"Olympus Mons"}"#),
        ]),
        text_reply("chatcmpl-final", "Tokyo is 10°C; Olympus Mons is unknown."),
    ]);

    let turn = run_tool_turn(&backend, &offline_ctx(), "Weather in Tokyo and Olympus Mons?")
        .await
        .unwrap();

    // 2回目の応答をそのまま返す
    assert_eq!(turn.response["id"], "chatcmpl-final");
    assert_eq!(turn.resolutions.len(), 2);
    assert!(turn.resolutions.iter().all(ToolResolution::is_executed));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    let follow_up = &requests[1];
    assert!(follow_up.tools.is_empty());
    // user, assistant(tool_calls), tool, tool
    assert_eq!(follow_up.messages.len(), 4);
    assert!(matches!(follow_up.messages[0], ChatCompletionRequestMessage::User(_)));
    assert!(matches!(follow_up.messages[1], ChatCompletionRequestMessage::Assistant(_)));

    let (id, content) = tool_message(&follow_up.messages[2]).unwrap();
    assert_eq!(id, "call_tokyo");
    assert_eq!(content, json!({ "location": "Tokyo", "temperature": "10", "unit": "celsius" }));

    let (id, content) = tool_message(&follow_up.messages[3]).unwrap();
    assert_eq!(id, "call_mars");
    assert_eq!(content, json!({ "location": "Olympus Mons", "temperature": "unknown" }));
}

#[tokio::test]
async fn unknown_tool_is_reported_back_instead_of_failing() {
    let backend = ScriptedChat::new(vec![
        tool_call_reply(vec![call("call_x", "launch_rocket", "{}")]),
        text_reply("chatcmpl-final", "I can't do that."),
    ]);

    let turn = run_tool_turn(&backend, &offline_ctx(), "launch").await.unwrap();
    assert!(matches!(
        turn.resolutions.as_slice(),
        [ToolResolution::ToolNotFound { requested, .. }] if requested == "launch_rocket"
    ));

    let requests = backend.requests();
    let (id, content) = tool_message(&requests[1].messages[2]).unwrap();
    assert_eq!(id, "call_x");
    assert_eq!(content["error"], "unknown tool: launch_rocket");
}

#[tokio::test]
async fn character_tools_reach_the_character_service() {
    let router = Router::new().route(
        "/characters",
        get(|| async { Json(json!({ "isSuccess": true, "characters": [ { "name": "Aria" }, { "name": "Bo" } ] })) })
            .post(|| async { axum::http::StatusCode::OK }),
    );
    let base = common::spawn_stub(router).await;
    let ctx = ToolContext {
        characters: CharacterClient::new(&CharacterApiSettings {
            url: format!("{base}/characters"),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    };

    let backend = Arc::new(ScriptedChat::new(vec![
        tool_call_reply(vec![
            call("call_list", "get_character_names", ""),
            call("call_new", "create_character", r#"{"name":"Cy"}"#),
        ]),
        text_reply("chatcmpl-final", "Done."),
    ]));

    let turn = run_tool_turn(backend.as_ref(), &ctx, "list and create").await.unwrap();
    assert_eq!(turn.resolutions.len(), 2);

    let requests = backend.requests();
    let (_, list) = tool_message(&requests[1].messages[2]).unwrap();
    assert_eq!(list, json!({ "isSuccess": true, "names": ["Aria", "Bo"] }));
    let (_, created) = tool_message(&requests[1].messages[3]).unwrap();
    assert_eq!(created, json!({ "isSuccess": true }));
}

#[tokio::test]
async fn character_service_outage_collapses_to_false_flag() {
    let backend = ScriptedChat::new(vec![
        tool_call_reply(vec![call("call_list", "get_character_names", "{}")]),
        text_reply("chatcmpl-final", "Service unavailable."),
    ]);

    let turn = run_tool_turn(&backend, &offline_ctx(), "who is there?").await.unwrap();
    // ツール自体は実行済み。失敗は isSuccess=false で伝える
    assert!(turn.resolutions[0].is_executed());
    let (_, content) = tool_message(&backend.requests()[1].messages[2]).unwrap();
    assert_eq!(content, json!({ "isSuccess": false }));
}
