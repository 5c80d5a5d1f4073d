#![allow(dead_code)]

use futures_util::stream;
use notebot_agent_api::AppState;
use notebot_agents::NotesClient;
use notebot_auth::{create_access_token, JwtSettings};
use notebot_llm_sdk::client::{LlmClient, StreamResult};
use notebot_llm_sdk::error::LlmError;
use notebot_llm_sdk::tools::ToolCall;
use notebot_llm_sdk::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Role, StreamChunk, Usage,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SECRET: &str = "gateway-test-secret";

/// Model double: requests `tool_call` until a tool result is in the history,
/// then streams `answer`.
pub struct MockLlmClient {
    pub tool_call: Option<ToolCall>,
    pub answer: Vec<String>,
    pub fail_with_status: Option<u16>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn answering(deltas: &[&str]) -> Self {
        Self {
            tool_call: None,
            answer: deltas.iter().map(|d| d.to_string()).collect(),
            fail_with_status: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calling(name: &str, arguments: serde_json::Value) -> Self {
        Self {
            tool_call: Some(ToolCall::new(
                "call_1".to_string(),
                name.to_string(),
                arguments,
            )),
            ..Self::answering(&[])
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::answering(&[])
        }
    }

    fn record(&self, request: &CompletionRequest) -> Result<(), LlmError> {
        if let Some(message) = request.messages.last() {
            self.prompts.lock().unwrap().push(message.text_content());
        }
        match self.fail_with_status {
            Some(status) => Err(LlmError::api_error(status, "model unavailable".to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.record(&request)?;
        Ok(CompletionResponse {
            content: vec![ContentBlock::Text {
                text: self.answer.concat(),
            }],
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("stop".to_string()),
            tool_calls: None,
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn stream_complete(&self, request: CompletionRequest) -> Result<StreamResult, LlmError> {
        self.record(&request)?;
        let answered = request
            .messages
            .last()
            .map(|m| m.role == Role::Tool)
            .unwrap_or(false);

        let chunks = match &self.tool_call {
            Some(call) if !answered => vec![StreamChunk::finished(vec![call.clone()])],
            _ => {
                let mut chunks: Vec<StreamChunk> =
                    self.answer.iter().map(StreamChunk::text).collect();
                chunks.push(StreamChunk::finished(Vec::new()));
                chunks
            }
        };
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}

pub fn jwt() -> JwtSettings {
    JwtSettings::new(SECRET)
}

pub fn token_for(user_id: i64, email: &str) -> String {
    create_access_token(user_id, email, &jwt()).unwrap()
}

pub fn app_state(llm: Arc<MockLlmClient>, notes_url: &str, idle_timeout: Duration) -> AppState {
    let notes = NotesClient::new(notes_url, Duration::from_secs(5)).unwrap();
    AppState::new(llm, notes, "mock-model", jwt(), idle_timeout)
}
