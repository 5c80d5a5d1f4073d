use crate::transport::{SessionEnd, SessionTransport};
use crate::AppState;
use actix::prelude::*;
use actix_web::{http::header::AUTHORIZATION, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use async_trait::async_trait;
use notebot_agents::FrameSink;
use notebot_auth::{bearer_token, verify_access_token, AuthError, JwtSettings};
use shared_types::EventFrame;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A frame produced by the session loop, to be written to the socket
#[derive(Message)]
#[rtype(result = "()")]
struct OutboundFrame(EventFrame);

enum Admission {
    Accepted(SessionTransport),
    Rejected(String),
}

/// WebSocket connection actor for `/ws/bot`.
///
/// The actor owns the socket. The conversation itself runs in a future
/// spawned on the actor's context, fed through an inbound channel and
/// writing back through [`OutboundFrame`] messages. Stopping the actor drops
/// that future, which abandons any in-flight run.
pub struct ChatConnection {
    connection_id: Uuid,
    admission: Option<Admission>,
    inbound: Option<mpsc::UnboundedSender<String>>,
}

impl ChatConnection {
    pub fn accepted(transport: SessionTransport) -> Self {
        Self {
            connection_id: transport.session_id(),
            admission: Some(Admission::Accepted(transport)),
            inbound: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            admission: Some(Admission::Rejected(reason.into())),
            inbound: None,
        }
    }

    fn session_ended(&mut self, end: SessionEnd, ctx: &mut ws::WebsocketContext<Self>) {
        self.inbound = None;
        match end {
            SessionEnd::TimedOut => {
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Normal,
                    description: Some("idle timeout".to_string()),
                }));
                ctx.stop();
            }
            SessionEnd::PeerClosed => ctx.stop(),
        }
    }
}

impl Actor for ChatConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        match self.admission.take() {
            Some(Admission::Accepted(transport)) => {
                tracing::info!(connection_id = %self.connection_id, "WebSocket connection started");

                let (tx, mut rx) = mpsc::unbounded_channel();
                self.inbound = Some(tx);
                let mut sink = ConnectionSink {
                    addr: ctx.address(),
                };

                let session = async move { transport.serve(&mut rx, &mut sink).await };
                ctx.spawn(
                    session
                        .into_actor(self)
                        .map(|end, act, ctx| act.session_ended(end, ctx)),
                );
            }
            Some(Admission::Rejected(reason)) => {
                tracing::warn!(connection_id = %self.connection_id, "Rejecting connection: {}", reason);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some(reason),
                }));
                ctx.stop();
            }
            None => ctx.stop(),
        }
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        tracing::info!(connection_id = %self.connection_id, "WebSocket connection stopping");
        Running::Stop
    }
}

impl Handler<OutboundFrame> for ChatConnection {
    type Result = ();

    fn handle(&mut self, msg: OutboundFrame, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(json) => ctx.text(json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize frame"),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                let delivered = self
                    .inbound
                    .as_ref()
                    .map(|tx| tx.send(text.to_string()).is_ok())
                    .unwrap_or(false);
                if !delivered {
                    tracing::debug!(connection_id = %self.connection_id, "Message after session end ignored");
                }
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::debug!("Binary message received (ignored)");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(connection_id = %self.connection_id, "WebSocket closed by peer: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(connection_id = %self.connection_id, error = %e, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

/// Hands frames to the connection actor
struct ConnectionSink {
    addr: Addr<ChatConnection>,
}

#[async_trait]
impl FrameSink for ConnectionSink {
    async fn send(&mut self, frame: EventFrame) -> anyhow::Result<()> {
        if !self.addr.connected() {
            anyhow::bail!("connection closed");
        }
        self.addr.do_send(OutboundFrame(frame));
        Ok(())
    }
}

/// Resolve the bearer token of a handshake request.
///
/// The token must be present, non-empty and verify against `settings`.
pub fn authenticate_handshake(req: &HttpRequest, settings: &JwtSettings) -> Result<String, AuthError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::MissingToken)?;
    verify_access_token(token, settings)?;
    Ok(token.to_string())
}

/// `GET /ws/bot`
pub async fn chat_websocket(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let connection = match authenticate_handshake(&req, &state.jwt) {
        Ok(token) => ChatConnection::accepted(SessionTransport::new(
            state.bot.clone(),
            token,
            state.idle_timeout,
        )),
        Err(e) => ChatConnection::rejected(e.to_string()),
    };
    ws::start(connection, &req, stream)
}
