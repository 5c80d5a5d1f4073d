use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============ Users & Login ============

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserCreate {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Public view of a user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Issued after registration or login
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Token {
    pub id: i64,
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(id: i64, access_token: String) -> Self {
        Self {
            id,
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Form-encoded login body. `username` holds the email address.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
