use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod auth;
pub mod chat;
pub mod notes;
pub mod typescript_gen;

pub use typescript_gen::generate_typescript_definitions;

pub use auth::{LoginForm, Token, UserCreate, UserOut};
pub use chat::{ClientMessage, EventFrame, Turn, TurnRole};
pub use notes::{NoteCreate, NoteOut, NoteResponse, NoteText};

// Shared models for the notes service, the chat gateway and the chat client

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
