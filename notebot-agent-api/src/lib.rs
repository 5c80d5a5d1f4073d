use actix_cors::Cors;
use actix_web::web;
use notebot_agents::{AgentDefinition, Bot, NotesClient};
use notebot_auth::{AuthenticationMiddleware, JwtSettings};
use notebot_llm_sdk::client::LlmClient;
use notebot_llm_sdk::openai::OpenAIClient;
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod error;
pub mod handlers;
pub mod transport;
pub mod websocket;

use config::{AgentApiConfig, CorsConfig};
use error::{AppError, AppResult};

/// Everything the gateway's handlers share, built once at startup
pub struct AppState {
    pub bot: Arc<Bot>,
    pub llm: Arc<dyn LlmClient>,
    pub grammar_model: String,
    pub jwt: Arc<JwtSettings>,
    pub idle_timeout: Duration,
}

impl AppState {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        notes: NotesClient,
        model: impl Into<String>,
        jwt: JwtSettings,
        idle_timeout: Duration,
    ) -> Self {
        let model = model.into();
        let bot = Bot::new(
            llm.clone(),
            Arc::new(notes),
            AgentDefinition::notes_agent(model.clone()),
        );
        Self {
            bot: Arc::new(bot),
            llm,
            grammar_model: model,
            jwt: Arc::new(jwt),
            idle_timeout,
        }
    }

    pub fn from_config(config: &AgentApiConfig) -> AppResult<Self> {
        let api_key = config.llm.api_key.clone().unwrap_or_default();
        let mut client = OpenAIClient::new(api_key)?.with_model(config.llm.model.clone());
        if let Some(base_url) = &config.llm.base_url {
            client = client.with_base_url(base_url.clone());
        }

        let notes = NotesClient::new(config.notes.base_url.clone(), config.notes.timeout())
            .map_err(|e| AppError::Internal(format!("Failed to build notes client: {e}")))?;

        Ok(Self::new(
            Arc::new(client),
            notes,
            config.llm.model.clone(),
            config.auth.clone(),
            config.session.idle_timeout(),
        ))
    }
}

/// Register the gateway routes
pub fn configure(cfg: &mut web::ServiceConfig, jwt: Arc<JwtSettings>) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/ws/bot", web::get().to(websocket::chat_websocket))
        .service(
            web::scope("/bot")
                .wrap(AuthenticationMiddleware::new(jwt))
                .route("/grammar", web::post().to(handlers::correct_note_grammar)),
        );
}

pub fn build_cors(config: Option<&CorsConfig>) -> Cors {
    let origins = config.map(|c| c.allowed_origins.as_slice()).unwrap_or(&[]);
    let cors = Cors::default().allow_any_method().allow_any_header();
    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
