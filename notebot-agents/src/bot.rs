use crate::credential::CredentialContext;
use crate::notes_client::NotesClient;
use crate::runner::{run_streamed, AgentDefinition, RunError, RunEvent};
use crate::tools::NotesToolbox;
use async_trait::async_trait;
use futures_util::StreamExt;
use notebot_llm_sdk::client::LlmClient;
use notebot_llm_sdk::tools::ToolResult;
use notebot_llm_sdk::types::Message;
use shared_types::{EventFrame, Turn, TurnRole};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Destination of the frames a run produces
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: EventFrame) -> anyhow::Result<()>;
}

#[async_trait]
impl FrameSink for mpsc::UnboundedSender<EventFrame> {
    async fn send(&mut self, frame: EventFrame) -> anyhow::Result<()> {
        mpsc::UnboundedSender::send(self, frame)
            .map_err(|_| anyhow::anyhow!("frame receiver dropped"))
    }
}

#[async_trait]
impl FrameSink for Vec<EventFrame> {
    async fn send(&mut self, frame: EventFrame) -> anyhow::Result<()> {
        self.push(frame);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub state: RunState,
    pub frames_sent: usize,
    pub tool_calls: usize,
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Agent run failed: {0}")]
    Run(#[from] RunError),
}

/// Runs the notes agent for one conversation at a time and turns its events
/// into client frames.
///
/// One `Bot` is built at startup and shared. Each call to [`Bot::run`] gets
/// its own credential scope, so concurrent runs stay isolated.
pub struct Bot {
    llm: Arc<dyn LlmClient>,
    notes: Arc<NotesClient>,
    agent: Arc<AgentDefinition>,
}

impl Bot {
    pub fn new(llm: Arc<dyn LlmClient>, notes: Arc<NotesClient>, agent: AgentDefinition) -> Self {
        Self {
            llm,
            notes,
            agent: Arc::new(agent),
        }
    }

    pub fn agent(&self) -> &AgentDefinition {
        &self.agent
    }

    /// Run the agent over `turns` on behalf of the holder of `token`,
    /// forwarding frames to `sink` in the order the runner yields events.
    pub async fn run<S>(
        &self,
        turns: &[Turn],
        token: &str,
        sink: &mut S,
    ) -> Result<RunSummary, BotError>
    where
        S: FrameSink + ?Sized,
    {
        let mut summary = RunSummary {
            run_id: Uuid::new_v4(),
            state: RunState::Idle,
            frames_sent: 0,
            tool_calls: 0,
        };

        let credentials = CredentialContext::new();
        let _scope = credentials.set(token);
        let toolbox = Arc::new(NotesToolbox::new(self.notes.clone(), credentials));

        let mut events = run_streamed(
            self.llm.clone(),
            self.agent.clone(),
            toolbox,
            turns_to_messages(turns),
        );
        summary.state = RunState::Running;
        info!(run_id = %summary.run_id, turns = turns.len(), "=== Run starting ===");

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    summary.state = RunState::Failed;
                    error!(run_id = %summary.run_id, error = %e, "Run failed");
                    return Err(e.into());
                }
            };
            if let Err(e) = self.handle_event(event, sink, &mut summary).await {
                error!(run_id = %summary.run_id, error = %e, "Error processing event");
            }
        }

        summary.state = RunState::Completed;
        info!(
            run_id = %summary.run_id,
            frames = summary.frames_sent,
            tool_calls = summary.tool_calls,
            "=== Run complete ==="
        );
        Ok(summary)
    }

    async fn handle_event<S>(
        &self,
        event: RunEvent,
        sink: &mut S,
        summary: &mut RunSummary,
    ) -> anyhow::Result<()>
    where
        S: FrameSink + ?Sized,
    {
        let frame = match event {
            RunEvent::RawTextDelta(delta) => EventFrame::MessageResponse { message: delta },
            RunEvent::AgentUpdated { name } => {
                info!(run_id = %summary.run_id, "Agent updated: {}", name);
                return Ok(());
            }
            RunEvent::ToolCallStarted { call } => {
                info!(run_id = %summary.run_id, tool = call.name(), "-- Tool was called");
                summary.tool_calls += 1;
                return Ok(());
            }
            RunEvent::ToolCallCompleted { name, output, .. } => {
                info!(run_id = %summary.run_id, tool = %name, "-- Tool output: {}", output);
                EventFrame::ToolCallOutput { message: output }
            }
            RunEvent::MessageOutput { text } => {
                info!(run_id = %summary.run_id, "-- Message output:\n {}", text);
                EventFrame::final_output()
            }
        };

        sink.send(frame).await?;
        summary.frames_sent += 1;
        Ok(())
    }
}

/// Map client turns onto model messages. Tool turns without a call id
/// cannot be attached to a call and are passed on as assistant text.
pub fn turns_to_messages(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .map(|turn| match (turn.role, &turn.tool_call_id) {
            (TurnRole::User, _) => Message::user(turn.text()),
            (TurnRole::Assistant, _) => Message::assistant(turn.text()),
            (TurnRole::System, _) => Message::system(turn.text()),
            (TurnRole::Tool, Some(id)) => Message::tool_result(&ToolResult::text(id, turn.text())),
            (TurnRole::Tool, None) => Message::assistant(turn.text()),
        })
        .collect()
}
