use futures_util::StreamExt;
use mockito::Matcher;
use notebot_llm_sdk::client::LlmClient;
use notebot_llm_sdk::error::LlmError;
use notebot_llm_sdk::openai::OpenAIClient;
use notebot_llm_sdk::tools::{Tool, ToolChoice};
use notebot_llm_sdk::types::{CompletionRequest, Message, StreamChunk};
use serde_json::json;

fn sse(events: &[serde_json::Value]) -> String {
    let mut body: String = events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect();
    body.push_str("data: [DONE]\n\n");
    body
}

async fn collect(client: &OpenAIClient, request: CompletionRequest) -> Vec<StreamChunk> {
    let mut stream = client.stream_complete(request).unwrap();
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk.unwrap());
    }
    chunks
}

#[test]
fn test_client_implements_trait() {
    fn assert_implements_trait<T: LlmClient>() {}
    assert_implements_trait::<OpenAIClient>();

    let client: Box<dyn LlmClient> = Box::new(OpenAIClient::new("test-key").unwrap());
    assert_eq!(client.provider_name(), "openai");
    assert_eq!(client.model_name(), "gpt-4o-mini-2024-07-18");
}

#[tokio::test]
async fn test_stream_yields_text_deltas_then_finish() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]}),
            json!({"choices": [{"index": 0, "delta": {"content": "Hel"}}]}),
            json!({"choices": [{"index": 0, "delta": {"content": "lo"}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}),
        ]))
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let chunks = collect(
        &client,
        CompletionRequest::new("gpt-4o-mini", vec![Message::user("hi")]),
    )
    .await;

    mock.assert_async().await;
    let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["Hel", "lo", ""]);
    assert!(chunks.last().unwrap().is_finished);
    assert!(chunks.last().unwrap().tool_calls.is_empty());
}

#[tokio::test]
async fn test_stream_reassembles_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "id": "call_abc", "type": "function",
                 "function": {"name": "get_notes", "arguments": ""}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"limit\":"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": " 5}"}}
            ]}}]}),
            json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
        ]))
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let chunks = collect(
        &client,
        CompletionRequest::new("gpt-4o-mini", vec![Message::user("list my notes")]),
    )
    .await;

    assert_eq!(chunks.len(), 1);
    let last = &chunks[0];
    assert!(last.is_finished);
    assert_eq!(last.tool_calls.len(), 1);
    assert_eq!(last.tool_calls[0].id(), "call_abc");
    assert_eq!(last.tool_calls[0].name(), "get_notes");
    assert_eq!(last.tool_calls[0].raw_arguments(), &json!({"limit": 5}));
}

#[tokio::test]
async fn test_stream_ignores_comments_and_event_names() {
    let mut server = mockito::Server::new_async().await;
    let chunk = json!({"choices": [{"index": 0, "delta": {"content": "hi"}}]});
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(format!(
            ": keep-alive\r\n\r\nevent: completion\r\ndata: {}\r\n\r\ndata: [DONE]\r\n\r\n",
            chunk
        ))
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let chunks = collect(&client, CompletionRequest::new("m", vec![Message::user("hi")])).await;

    let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["hi", ""]);
    assert!(chunks[1].is_finished);
}

#[derive(serde::Deserialize, schemars::JsonSchema)]
#[allow(dead_code)]
struct Lookup {
    note_id: i64,
}

#[tokio::test]
async fn test_stream_sends_tools_and_tool_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"tool_choice": "required"})),
            Matcher::Regex(r#""name":"get_note""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[]))
        .create_async()
        .await;

    let tool = Tool::function::<Lookup>("get_note", "Fetch one note");
    let request = CompletionRequest::new("m", vec![Message::user("note 3")])
        .with_tools(vec![tool])
        .with_tool_choice(ToolChoice::Required);

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let chunks = collect(&client, request).await;

    mock.assert_async().await;
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_finished);
}

#[tokio::test]
async fn test_stream_maps_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("bad-key")
        .unwrap()
        .with_base_url(server.url());
    let mut stream = client
        .stream_complete(CompletionRequest::new("m", vec![Message::user("hi")]))
        .unwrap();

    match stream.next().await {
        Some(Err(LlmError::Authentication { message })) => {
            assert_eq!(message, "Incorrect API key provided")
        }
        other => panic!("unexpected item: {:?}", other.map(|r| r.map(|c| c.content))),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_complete_returns_text_and_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "get_note", "arguments": "{\"note_id\": 7}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let response = client
        .complete(CompletionRequest::new("gpt-4o-mini", vec![Message::user("note 7")]))
        .await
        .unwrap();

    assert_eq!(response.text(), "");
    assert_eq!(response.usage.input_tokens, 12);
    assert_eq!(response.stop_reason.as_deref(), Some("tool_calls"));
    let calls = response.tool_calls.unwrap();
    assert_eq!(calls[0].name(), "get_note");
    assert_eq!(calls[0].raw_arguments(), &json!({"note_id": 7}));
}

#[tokio::test]
async fn test_complete_maps_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "20")
        .with_body("slow down")
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());
    let err = client
        .complete(CompletionRequest::new("m", vec![Message::user("hi")]))
        .await
        .unwrap_err();

    match err {
        LlmError::RateLimit {
            message,
            retry_after,
        } => {
            assert_eq!(message, "slow down");
            assert_eq!(retry_after, Some(20));
        }
        other => panic!("unexpected error: {}", other),
    }
}
