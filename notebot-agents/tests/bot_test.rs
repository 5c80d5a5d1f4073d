mod common;

use async_trait::async_trait;
use common::ScriptedLlm;
use mockito::Matcher;
use notebot_agents::{AgentDefinition, Bot, BotError, FrameSink, NotesClient, RunState};
use notebot_llm_sdk::types::Role;
use serde_json::{json, Value};
use shared_types::{EventFrame, Turn};
use std::sync::Arc;
use std::time::Duration;

fn bot(llm: Arc<ScriptedLlm>, notes_url: &str) -> Bot {
    let notes = NotesClient::new(notes_url, Duration::from_secs(5)).unwrap();
    Bot::new(
        llm,
        Arc::new(notes),
        AgentDefinition::notes_agent("scripted-model"),
    )
}

fn kinds(frames: &[EventFrame]) -> Vec<&'static str> {
    frames.iter().map(EventFrame::kind).collect()
}

fn tool_output(frames: &[EventFrame]) -> Value {
    frames
        .iter()
        .find_map(|frame| match frame {
            EventFrame::ToolCallOutput { message } => Some(serde_json::from_str(message).unwrap()),
            _ => None,
        })
        .expect("no tool_call_output frame")
}

#[tokio::test]
async fn test_frames_follow_generation_order() {
    let mut server = mockito::Server::new_async().await;
    let _notes = server
        .mock("GET", "/notes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": [], "limit": 10, "page": 1, "total": 0}"#)
        .create_async()
        .await;

    let llm = Arc::new(
        ScriptedLlm::new()
            .tool_deltas(&["Let", " me", " check"])
            .tool_call("get_notes", json!({})),
    );
    let bot = bot(llm.clone(), &server.url());

    let mut frames = Vec::new();
    let summary = bot
        .run(&[Turn::user("list my notes")], "token-a", &mut frames)
        .await
        .unwrap();

    assert_eq!(
        kinds(&frames),
        vec![
            "message_response",
            "message_response",
            "message_response",
            "tool_call_output",
            "final_output",
        ]
    );
    assert_eq!(
        frames[..3],
        [
            EventFrame::MessageResponse { message: "Let".into() },
            EventFrame::MessageResponse { message: " me".into() },
            EventFrame::MessageResponse { message: " check".into() },
        ]
    );
    assert_eq!(frames[4], EventFrame::FinalOutput { message: None });
    assert_eq!(summary.state, RunState::Completed);
    assert_eq!(summary.frames_sent, 5);
    assert_eq!(summary.tool_calls, 1);
    assert_eq!(llm.request_count(), 2);
}

#[tokio::test]
async fn test_list_my_notes_end_to_end() {
    let listing = json!({
        "data": [{"id": 1, "title": "groceries", "note": "milk", "created_at": "2024-05-01T10:00:00Z"}],
        "limit": 10,
        "page": 1,
        "total": 1
    });
    let mut server = mockito::Server::new_async().await;
    let notes = server
        .mock("GET", "/notes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .match_header("authorization", "Bearer token-a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(listing.to_string())
        .create_async()
        .await;

    let llm = Arc::new(
        ScriptedLlm::new()
            .tool_call("get_notes", json!({"limit": 10, "page": 1, "search": ""}))
            .answer(&["You have one note: groceries."]),
    );
    let bot = bot(llm.clone(), &server.url());

    let client_frame: shared_types::ClientMessage =
        serde_json::from_value(json!({"messages": [{"role": "user", "content": "list my notes"}]}))
            .unwrap();
    let mut frames = Vec::new();
    bot.run(&client_frame.messages, "token-a", &mut frames)
        .await
        .unwrap();

    notes.assert_async().await;
    assert_eq!(tool_output(&frames), listing);
    assert_eq!(
        serde_json::to_value(frames.last().unwrap()).unwrap(),
        json!({"type": "final_output", "message": null})
    );
    let tool_pos = frames
        .iter()
        .position(|f| f.kind() == "tool_call_output")
        .unwrap();
    assert!(tool_pos < frames.len() - 1);

    // The tool result went back to the model under the id of the call
    let requests = llm.requests.lock().unwrap();
    let followup = requests[1].messages.last().unwrap();
    assert_eq!(followup.role, Role::Tool);
    assert_eq!(followup.tool_call_id.as_deref(), Some("call_1"));
}

#[tokio::test]
async fn test_gateway_errors_reach_the_client_as_tool_output() {
    let mut server = mockito::Server::new_async().await;
    let _missing = server
        .mock("GET", "/notes/42")
        .with_status(404)
        .with_body(r#"{"detail": "Note with id: 42 was not found"}"#)
        .create_async()
        .await;

    let llm = Arc::new(ScriptedLlm::new().tool_call("get_note", json!({"note_id": 42})));
    let bot = bot(llm, &server.url());

    let mut frames = Vec::new();
    let summary = bot
        .run(&[Turn::user("show note 42")], "token-a", &mut frames)
        .await
        .unwrap();

    let output = tool_output(&frames);
    assert_eq!(output["status_code"], 404);
    assert!(output["error"].as_str().unwrap().contains("HTTP error occurred"));
    assert_eq!(summary.state, RunState::Completed);
}

#[tokio::test]
async fn test_concurrent_runs_keep_their_own_credentials() {
    let mut server = mockito::Server::new_async().await;
    let mut mocks = Vec::new();
    for token in ["token-a", "token-b"] {
        let mock = server
            .mock("GET", "/notes")
            .match_query(Matcher::Any)
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .with_status(200)
            .with_body(json!({"data": [], "owner_token": token}).to_string())
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let llm = Arc::new(ScriptedLlm::new().tool_call("get_notes", json!({})));
    let bot = bot(llm, &server.url());

    let mut frames_a = Vec::new();
    let mut frames_b = Vec::new();
    let turns_a = [Turn::user("list")];
    let turns_b = [Turn::user("list")];
    let (a, b) = tokio::join!(
        bot.run(&turns_a, "token-a", &mut frames_a),
        bot.run(&turns_b, "token-b", &mut frames_b),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(tool_output(&frames_a)["owner_token"], "token-a");
    assert_eq!(tool_output(&frames_b)["owner_token"], "token-b");
    for mock in mocks {
        mock.assert_async().await;
    }
}

/// Fails on the first frame it is given, accepts the rest
struct FlakySink {
    failed: bool,
    frames: Vec<EventFrame>,
}

#[async_trait]
impl FrameSink for FlakySink {
    async fn send(&mut self, frame: EventFrame) -> anyhow::Result<()> {
        if !self.failed {
            self.failed = true;
            anyhow::bail!("socket hiccup");
        }
        self.frames.push(frame);
        Ok(())
    }
}

#[tokio::test]
async fn test_one_failed_frame_does_not_abort_the_run() {
    let llm = Arc::new(ScriptedLlm::new().answer(&["Hello", " there"]));
    let bot = bot(llm, "http://127.0.0.1:9");

    let mut sink = FlakySink {
        failed: false,
        frames: Vec::new(),
    };
    let summary = bot.run(&[Turn::user("hi")], "t", &mut sink).await.unwrap();

    assert_eq!(
        sink.frames,
        vec![
            EventFrame::MessageResponse {
                message: " there".into()
            },
            EventFrame::final_output(),
        ]
    );
    assert_eq!(summary.frames_sent, 2);
    assert_eq!(summary.state, RunState::Completed);
}

#[tokio::test]
async fn test_model_failure_ends_the_run() {
    let llm = Arc::new(ScriptedLlm::new().failing(503));
    let bot = bot(llm, "http://127.0.0.1:9");

    let mut frames = Vec::new();
    let err = bot
        .run(&[Turn::user("hi")], "t", &mut frames)
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::Run(_)));
    assert!(err.to_string().starts_with("Agent run failed"));
    assert!(frames.is_empty());
}
