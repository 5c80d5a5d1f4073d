use crate::error::{AuthError, AuthResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Signing settings. Both services must share the same values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expire_minutes")]
    pub access_token_expire_minutes: i64,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expire_minutes() -> i64 {
    30
}

impl JwtSettings {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            algorithm: default_algorithm(),
            access_token_expire_minutes: default_expire_minutes(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret_key.trim().is_empty()
    }

    fn algorithm(&self) -> AuthResult<Algorithm> {
        let algorithm = Algorithm::from_str(&self.algorithm)
            .map_err(|_| AuthError::UnsupportedAlgorithm(self.algorithm.clone()))?;
        // Only shared-secret algorithms make sense with `secret_key`
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            _ => Err(AuthError::UnsupportedAlgorithm(self.algorithm.clone())),
        }
    }
}

/// Identity carried by an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub user_email: String,
    pub exp: i64, // Expiration time (Unix timestamp)
    pub iat: i64, // Issued at (Unix timestamp)
}

impl Claims {
    pub fn new(user_id: i64, user_email: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            user_email: user_email.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Issue a signed token that expires after `access_token_expire_minutes`
pub fn create_access_token(
    user_id: i64,
    user_email: &str,
    settings: &JwtSettings,
) -> AuthResult<String> {
    let claims = Claims::new(
        user_id,
        user_email,
        Duration::minutes(settings.access_token_expire_minutes),
    );
    encode_claims(&claims, settings)
}

pub(crate) fn encode_claims(claims: &Claims, settings: &JwtSettings) -> AuthResult<String> {
    encode(
        &Header::new(settings.algorithm()?),
        claims,
        &EncodingKey::from_secret(settings.secret_key.as_bytes()),
    )
    .map_err(|e| AuthError::Issue(e.to_string()))
}

/// Check signature, algorithm and expiry, returning the embedded claims
pub fn verify_access_token(token: &str, settings: &JwtSettings) -> AuthResult<Claims> {
    let mut validation = Validation::new(settings.algorithm()?);
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret_key.as_bytes()),
        &validation,
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Token part of an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Empty tokens count as absent.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
