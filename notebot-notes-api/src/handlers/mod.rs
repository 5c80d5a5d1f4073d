pub mod notes;
pub mod users;

use crate::database::UserRecord;
use crate::error::AppResult;
use crate::AppState;
use actix_web::HttpResponse;
use notebot_auth::{AuthError, AuthenticatedUser};
use shared_types::HealthResponse;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Resolve a verified token to a user that still exists
fn current_user(state: &AppState, auth: &AuthenticatedUser) -> AppResult<UserRecord> {
    state.db.get_user_by_email(&auth.email)?.ok_or_else(|| {
        tracing::warn!(user_id = auth.id, "Token refers to a user that no longer exists");
        AuthError::InvalidToken("unknown user".to_string()).into()
    })
}
