#![allow(dead_code)]

use notebot_auth::JwtSettings;
use notebot_notes_api::database::Database;
use notebot_notes_api::AppState;

pub const SECRET: &str = "notes-test-secret";

pub fn app_state() -> AppState {
    AppState::new(Database::open_in_memory().unwrap(), JwtSettings::new(SECRET))
}

/// Build an in-memory service and bind it to `$app`, keeping the state around as `$state`
macro_rules! test_app {
    ($state:ident, $app:ident) => {
        let $state = actix_web::web::Data::new(common::app_state());
        let jwt = $state.jwt.clone();
        let $app = actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(move |cfg| notebot_notes_api::configure(cfg, jwt)),
        )
        .await;
    };
}

/// Register `email` and return its access token
macro_rules! register {
    ($app:expr, $email:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/users/register")
            .set_json(serde_json::json!({
                "name": "Test",
                "email": $email,
                "password": "password123"
            }))
            .to_request();
        let token: serde_json::Value = actix_web::test::call_and_read_body_json(&$app, req).await;
        token["access_token"].as_str().unwrap().to_string()
    }};
}
