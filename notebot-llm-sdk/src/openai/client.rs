use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::{
    client::{LlmClient, StreamResult},
    error::LlmError,
    openai::{
        stream::{ToolCallAccumulator, DONE_MARKER},
        tools::OpenAIToolFormat,
        types::{
            OpenAIChatCompletionChunk, OpenAIChatCompletionRequest, OpenAIChatCompletionResponse,
            OpenAIErrorResponse, OpenAIFunctionCall, OpenAIMessage, OpenAIRole, OpenAIToolCall,
        },
    },
    tools::{ProviderToolFormat, ToolCall},
    types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, StreamChunk, Usage},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";

/// OpenAI LLM client
#[derive(Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minute timeout
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API. A trailing `/v1` is tolerated.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = url.trim_end_matches('/');
        self.base_url = url.strip_suffix("/v1").unwrap_or(url).to_string();
        self
    }

    /// Model reported by `model_name` and used when a request leaves it empty
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Create a chat completion using the OpenAI Chat Completions API
    pub async fn create_chat_completion(
        &self,
        request: OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, LlmError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))
    }

    fn build_request(
        &self,
        request: CompletionRequest,
        stream: bool,
    ) -> OpenAIChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(OpenAIMessage {
                role: OpenAIRole::System,
                content: Some(system),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.into_iter().map(to_openai_message));

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model
        };

        OpenAIChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            stream: stream.then_some(true),
            tools: request.tools.as_ref().map(|tools| {
                tools
                    .iter()
                    .map(OpenAIToolFormat::to_provider_tool)
                    .collect()
            }),
            tool_choice: request
                .tool_choice
                .as_ref()
                .map(OpenAIToolFormat::to_provider_tool_choice),
        }
    }
}

fn chat_stream(
    http_client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    body: OpenAIChatCompletionRequest,
) -> impl Stream<Item = Result<StreamChunk, LlmError>> + Send + 'static {
    try_stream! {
        let response = http_client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let response = if response.status().is_success() {
            response
        } else {
            Err::<reqwest::Response, LlmError>(error_from_response(response).await)?
        };

        let mut events = response.bytes_stream().eventsource();
        let mut tool_calls = ToolCallAccumulator::default();
        let mut done = false;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::stream(e.to_string()))?;
            if event.data == DONE_MARKER {
                done = true;
                break;
            }
            if event.data.is_empty() {
                continue;
            }
            trace!(data = %event.data, "OpenAI SSE event");

            let parsed: OpenAIChatCompletionChunk = serde_json::from_str(&event.data)?;
            for choice in parsed.choices {
                if let Some(deltas) = choice.delta.tool_calls {
                    tool_calls.apply(deltas);
                }
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield StreamChunk::text(text);
                    }
                }
            }
        }

        if !done {
            warn!("Completion stream ended without a [DONE] marker");
        }
        if !tool_calls.is_empty() {
            debug!("Completion stream requested tool calls");
        }
        yield StreamChunk::finished(tool_calls.finish()?);
    }
}

fn to_openai_message(message: Message) -> OpenAIMessage {
    let role = match message.role {
        Role::User => OpenAIRole::User,
        Role::Assistant => OpenAIRole::Assistant,
        Role::System => OpenAIRole::System,
        Role::Tool => OpenAIRole::Tool,
    };
    let text = message.text_content();
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|call| OpenAIToolCall {
                    id: call.id().to_string(),
                    r#type: "function".to_string(),
                    function: OpenAIFunctionCall {
                        name: call.name().to_string(),
                        arguments: call.raw_arguments().to_string(),
                    },
                })
                .collect(),
        )
    };
    let content = if text.is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(text)
    };

    OpenAIMessage {
        role,
        content,
        tool_calls,
        tool_call_id: message.tool_call_id,
    }
}

/// Map a non-success response to the matching error variant
async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();

    // Extract retry-after header before consuming the response
    let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    } else {
        None
    };

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
        .map(|e| e.error.message)
        .unwrap_or(error_text);

    match status {
        reqwest::StatusCode::BAD_REQUEST => LlmError::invalid_request(message),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::authentication(message)
        }
        reqwest::StatusCode::PAYLOAD_TOO_LARGE => LlmError::invalid_request("Request too large"),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limit(message, retry_after),
        _ => LlmError::api_error(status.as_u16(), message),
    }
}

impl OpenAIChatCompletionResponse {
    /// Content of the first choice
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
    }

    /// Extract tool calls from the response
    pub fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()?
            .message
            .tool_calls
            .as_ref()
            .map(|calls| {
                calls
                    .iter()
                    .map(|call| {
                        let arguments: serde_json::Value =
                            serde_json::from_str(&call.function.arguments)
                                .unwrap_or(serde_json::Value::Null);

                        ToolCall::new(call.id.clone(), call.function.name.clone(), arguments)
                    })
                    .collect()
            })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let openai_request = self.build_request(request, false);
        let openai_response = self.create_chat_completion(openai_request).await?;

        let Some(choice) = openai_response.choices.first() else {
            return Err(LlmError::internal("No completion choices returned"));
        };

        let usage = openai_response.usage.clone().unwrap_or_default();

        Ok(CompletionResponse {
            content: vec![ContentBlock::Text {
                text: openai_response.content().to_string(),
            }],
            role: Role::Assistant,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
            stop_reason: choice.finish_reason.clone(),
            tool_calls: openai_response.tool_calls(),
        })
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn stream_complete(&self, request: CompletionRequest) -> Result<StreamResult, LlmError> {
        let body = self.build_request(request, true);
        let headers = self.headers()?;
        Ok(Box::pin(chat_stream(
            self.http_client.clone(),
            self.endpoint(),
            headers,
            body,
        )))
    }
}
