use crate::error::AppResult;
use crate::AppState;
use actix_web::{web, HttpResponse};
use notebot_agents::correct_grammar;
use notebot_auth::AuthenticatedUser;
use shared_types::{HealthResponse, NoteText};

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /bot/grammar`
pub async fn correct_note_grammar(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<NoteText>,
) -> AppResult<HttpResponse> {
    tracing::info!(user_id = user.id, chars = body.note.len(), "Grammar correction requested");
    let note = correct_grammar(state.llm.as_ref(), &state.grammar_model, &body.note).await?;
    Ok(HttpResponse::Ok().json(NoteText { note }))
}
