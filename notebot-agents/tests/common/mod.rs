#![allow(dead_code)]

use futures_util::stream;
use notebot_llm_sdk::client::{LlmClient, StreamResult};
use notebot_llm_sdk::error::LlmError;
use notebot_llm_sdk::tools::ToolCall;
use notebot_llm_sdk::types::{
    CompletionRequest, CompletionResponse, ContentBlock, Role, StreamChunk, Usage,
};
use std::sync::Mutex;

/// Model double that answers from a fixed script.
///
/// While the last message is not a tool result it streams `tool_deltas` and
/// requests `tool_call`; once a tool result is in the history it streams
/// `answer` and stops calling tools.
pub struct ScriptedLlm {
    pub tool_deltas: Vec<String>,
    pub tool_call: Option<ToolCall>,
    pub answer: Vec<String>,
    pub always_call_tools: bool,
    pub fail_with_status: Option<u16>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            tool_deltas: Vec::new(),
            tool_call: None,
            answer: Vec::new(),
            always_call_tools: false,
            fail_with_status: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn tool_deltas(mut self, deltas: &[&str]) -> Self {
        self.tool_deltas = deltas.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn tool_call(mut self, name: &str, arguments: serde_json::Value) -> Self {
        self.tool_call = Some(ToolCall::new(
            "call_1".to_string(),
            name.to_string(),
            arguments,
        ));
        self
    }

    pub fn answer(mut self, deltas: &[&str]) -> Self {
        self.answer = deltas.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn always_call_tools(mut self) -> Self {
        self.always_call_tools = true;
        self
    }

    pub fn failing(mut self, status: u16) -> Self {
        self.fail_with_status = Some(status);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_chunks(&self, request: &CompletionRequest) -> Vec<StreamChunk> {
        let answered = request
            .messages
            .last()
            .map(|m| m.role == Role::Tool)
            .unwrap_or(false);

        match &self.tool_call {
            Some(call) if self.always_call_tools || !answered => {
                let mut chunks: Vec<StreamChunk> =
                    self.tool_deltas.iter().map(StreamChunk::text).collect();
                chunks.push(StreamChunk::finished(vec![call.clone()]));
                chunks
            }
            _ => {
                let mut chunks: Vec<StreamChunk> =
                    self.answer.iter().map(StreamChunk::text).collect();
                chunks.push(StreamChunk::finished(Vec::new()));
                chunks
            }
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        if let Some(status) = self.fail_with_status {
            return Err(LlmError::api_error(status, "scripted failure".to_string()));
        }
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
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }

    fn stream_complete(&self, request: CompletionRequest) -> Result<StreamResult, LlmError> {
        let chunks = self.next_chunks(&request);
        self.requests.lock().unwrap().push(request);
        if let Some(status) = self.fail_with_status {
            return Err(LlmError::api_error(status, "scripted failure".to_string()));
        }
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}
