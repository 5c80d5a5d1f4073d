use crate::error::{AppError, AppResult};
use crate::AppState;
use actix_web::{web, HttpResponse};
use notebot_auth::{create_access_token, hash_password, verify_password};
use shared_types::{LoginForm, Token, UserCreate, UserOut};

const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// `POST /users/register`
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<UserCreate>,
) -> AppResult<HttpResponse> {
    let UserCreate {
        name,
        email,
        password,
    } = body.into_inner();

    let email = email.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::Validation("value is not a valid email address".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .db
        .create_user(name.as_deref().unwrap_or_default(), &email, &password_hash)?
        .ok_or_else(|| AppError::Conflict("User already exists".to_string()))?;

    let access_token = create_access_token(user.id, &user.email, &state.jwt)?;
    tracing::info!(user_id = user.id, "User registered");
    Ok(HttpResponse::Created().json(Token::bearer(user.id, access_token)))
}

/// `GET /users/{email}`
pub async fn get_user(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    let email = email.into_inner();
    let user = state
        .db
        .get_user_by_email(&email)?
        .ok_or_else(|| AppError::NotFound(format!("User with email '{email}' not found")))?;
    Ok(HttpResponse::Ok().json(UserOut::from(user)))
}

/// `POST /login`, form encoded with the email in `username`
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let Some(user) = state.db.get_user_by_email(&form.username)? else {
        tracing::debug!("Login failed: unknown user");
        return Err(AppError::Forbidden(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(&form.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::Forbidden(INVALID_CREDENTIALS.to_string()));
    }

    let access_token = create_access_token(user.id, &user.email, &state.jwt)?;
    Ok(HttpResponse::Ok().json(Token::bearer(user.id, access_token)))
}
