use notebot_agents::{Bot, FrameSink};
use shared_types::{ClientMessage, EventFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const EMPTY_MESSAGES: &str = "Messages cannot be empty";

/// Why a session stopped reading client messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The inbound channel closed: the peer went away
    PeerClosed,
    /// No client message arrived within the idle window
    TimedOut,
}

/// Per-connection conversation loop over an already authenticated token.
///
/// Client messages are read one at a time. Each non-empty batch runs the bot
/// to completion before the next message is read, so a connection never has
/// two runs in flight. The idle window restarts after every run.
pub struct SessionTransport {
    session_id: Uuid,
    bot: Arc<Bot>,
    token: String,
    idle_timeout: Duration,
}

impl SessionTransport {
    pub fn new(bot: Arc<Bot>, token: impl Into<String>, idle_timeout: Duration) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            bot,
            token: token.into(),
            idle_timeout,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn serve<S>(
        &self,
        inbound: &mut mpsc::UnboundedReceiver<String>,
        sink: &mut S,
    ) -> SessionEnd
    where
        S: FrameSink + ?Sized,
    {
        info!(session_id = %self.session_id, "Session open");
        loop {
            let text = match timeout(self.idle_timeout, inbound.recv()).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    info!(session_id = %self.session_id, "Client disconnected");
                    return SessionEnd::PeerClosed;
                }
                Err(_) => {
                    info!(
                        session_id = %self.session_id,
                        idle_secs = self.idle_timeout.as_secs(),
                        "Session idle timeout"
                    );
                    return SessionEnd::TimedOut;
                }
            };
            self.handle_message(&text, sink).await;
        }
    }

    async fn handle_message<S>(&self, text: &str, sink: &mut S)
    where
        S: FrameSink + ?Sized,
    {
        debug!(session_id = %self.session_id, "Client message received: {}", text);

        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Failed to parse client message");
                self.send_error(sink, format!("Invalid message format: {e}")).await;
                return;
            }
        };

        if message.messages.is_empty() {
            self.send_error(sink, EMPTY_MESSAGES).await;
            return;
        }

        match self.bot.run(&message.messages, &self.token, sink).await {
            Ok(summary) => {
                debug!(
                    session_id = %self.session_id,
                    run_id = %summary.run_id,
                    frames = summary.frames_sent,
                    "Run finished"
                );
            }
            Err(e) => self.send_error(sink, e.to_string()).await,
        }
    }

    async fn send_error<S>(&self, sink: &mut S, message: impl Into<String>)
    where
        S: FrameSink + ?Sized,
    {
        if let Err(e) = sink.send(EventFrame::error(message)).await {
            warn!(session_id = %self.session_id, error = %e, "Failed to send error frame");
        }
    }
}
