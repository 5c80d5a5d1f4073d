use actix_cors::Cors;
use actix_web::web;
use notebot_auth::{AuthenticationMiddleware, JwtSettings};
use std::sync::Arc;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;

use config::CorsConfig;
use database::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub jwt: Arc<JwtSettings>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtSettings) -> Self {
        Self {
            db: Arc::new(db),
            jwt: Arc::new(jwt),
        }
    }
}

/// Register the notes service routes
pub fn configure(cfg: &mut web::ServiceConfig, jwt: Arc<JwtSettings>) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/login", web::post().to(handlers::users::login))
        .service(
            web::scope("/users")
                .route("/register", web::post().to(handlers::users::register))
                .route("/{email}", web::get().to(handlers::users::get_user)),
        )
        .service(
            web::scope("/notes")
                .wrap(AuthenticationMiddleware::new(jwt))
                .route("", web::get().to(handlers::notes::list_notes))
                .route("", web::post().to(handlers::notes::create_note))
                .route(
                    "/markdown",
                    web::post().to(handlers::notes::upload_markdown_note),
                )
                .route(
                    "/markdown/{id}",
                    web::get().to(handlers::notes::get_markdown_note),
                )
                .route("/{id}", web::get().to(handlers::notes::get_note))
                .route("/{id}", web::put().to(handlers::notes::update_note))
                .route("/{id}", web::delete().to(handlers::notes::delete_note)),
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
