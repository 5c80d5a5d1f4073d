use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use notebot_llm_sdk::client::LlmClient;
use notebot_llm_sdk::error::LlmError;
use notebot_llm_sdk::tools::{Tool, ToolCall, ToolChoice, ToolResult};
use notebot_llm_sdk::types::{CompletionRequest, Message};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Static description of an agent: who it is and how it talks to the model
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub max_tokens: u32,
    pub tool_choice: ToolChoice,
    /// Upper bound on model round trips within one run
    pub max_turns: usize,
}

impl AgentDefinition {
    pub fn notes_agent(model: impl Into<String>) -> Self {
        Self {
            name: "Notes Agent".to_string(),
            instructions: crate::prompts::NOTES_AGENT_PROMPT.to_string(),
            model: model.into(),
            max_tokens: 4096,
            tool_choice: ToolChoice::Auto,
            max_turns: 10,
        }
    }
}

/// Events yielded by a streamed run, in generation order
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The run is now driven by this agent
    AgentUpdated { name: String },
    /// Incremental assistant text
    RawTextDelta(String),
    /// The model asked for a tool call
    ToolCallStarted { call: ToolCall },
    /// A tool call finished with this output
    ToolCallCompleted {
        call_id: String,
        name: String,
        output: String,
    },
    /// The final assistant message of the run
    MessageOutput { text: String },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),

    #[error("run exceeded {0} model turns")]
    MaxTurnsExceeded(usize),
}

/// Something that can execute the tool calls a model emits
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definitions(&self) -> Vec<Tool>;

    /// Execute one call. Failures are returned as text, never raised.
    async fn call(&self, call: &ToolCall) -> String;
}

pub type RunStream = Pin<Box<dyn Stream<Item = Result<RunEvent, RunError>> + Send>>;

/// Drive `agent` over `input` until the model answers without tool calls.
///
/// The returned stream is lazy: nothing happens until it is polled, and
/// dropping it abandons the run.
pub fn run_streamed(
    llm: Arc<dyn LlmClient>,
    agent: Arc<AgentDefinition>,
    tools: Arc<dyn ToolHandler>,
    input: Vec<Message>,
) -> RunStream {
    Box::pin(run_stream(llm, agent, tools, input))
}

fn run_stream(
    llm: Arc<dyn LlmClient>,
    agent: Arc<AgentDefinition>,
    tools: Arc<dyn ToolHandler>,
    input: Vec<Message>,
) -> impl Stream<Item = Result<RunEvent, RunError>> + Send + 'static {
    try_stream! {
        yield RunEvent::AgentUpdated { name: agent.name.clone() };

        let definitions = tools.definitions();
        let mut history = input;

        for turn in 1..=agent.max_turns {
            let request = CompletionRequest::new(agent.model.clone(), history.clone())
                .with_system(agent.instructions.clone())
                .with_max_tokens(agent.max_tokens)
                .with_tools(definitions.clone())
                .with_tool_choice(agent.tool_choice);
            debug!(agent = %agent.name, turn, messages = history.len(), "Requesting model turn");

            let mut text = String::new();
            let mut tool_calls = Vec::new();

            let mut chunks = llm.stream_complete(request)?;
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                if !chunk.content.is_empty() {
                    text.push_str(&chunk.content);
                    yield RunEvent::RawTextDelta(chunk.content);
                }
                tool_calls.extend(chunk.tool_calls);
            }

            if tool_calls.is_empty() {
                yield RunEvent::MessageOutput { text };
                return;
            }

            history.push(Message::assistant_tool_calls(text, tool_calls.clone()));
            for call in tool_calls {
                yield RunEvent::ToolCallStarted { call: call.clone() };
                let output = tools.call(&call).await;
                history.push(Message::tool_result(&ToolResult::text(call.id(), output.clone())));
                yield RunEvent::ToolCallCompleted {
                    call_id: call.id().to_string(),
                    name: call.name().to_string(),
                    output,
                };
            }
        }

        Err::<(), RunError>(RunError::MaxTurnsExceeded(agent.max_turns))?;
    }
}
