use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use shared_types::ErrorResponse;
use thiserror::Error;

pub const CREDENTIALS_DETAIL: &str = "Could not validate credentials";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Failed to issue token: {0}")]
    Issue(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    fn is_credentials_error(&self) -> bool {
        matches!(self, AuthError::MissingToken | AuthError::InvalidToken(_))
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        if self.is_credentials_error() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_credentials_error() {
            HttpResponse::Unauthorized()
                .insert_header(("WWW-Authenticate", "Bearer"))
                .json(ErrorResponse::new("unauthorized", CREDENTIALS_DETAIL))
        } else {
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("internal_error", self.to_string()))
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
