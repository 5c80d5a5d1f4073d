use crate::error::AuthError;
use crate::token::{bearer_token, verify_access_token, JwtSettings};
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

/// Identity attached to a request once its bearer token has been verified
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    /// The raw token, kept so it can be forwarded to downstream services
    pub token: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AuthError::MissingToken.into()),
        )
    }
}

/// Rejects requests without a valid bearer token and attaches
/// [`AuthenticatedUser`] to the ones that pass.
#[derive(Clone)]
pub struct AuthenticationMiddleware {
    settings: Arc<JwtSettings>,
}

impl AuthenticationMiddleware {
    pub fn new(settings: Arc<JwtSettings>) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthenticationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthenticationMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddlewareService {
            service,
            settings: self.settings.clone(),
        }))
    }
}

pub struct AuthenticationMiddlewareService<S> {
    service: S,
    settings: Arc<JwtSettings>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        let Some(token) = token else {
            tracing::warn!(path = %req.path(), "Auth failed: missing bearer token");
            return Box::pin(async { Err(AuthError::MissingToken.into()) });
        };

        match verify_access_token(&token, &self.settings) {
            Ok(claims) => {
                tracing::debug!(user_id = claims.user_id, "Auth successful");
                req.extensions_mut().insert(AuthenticatedUser {
                    id: claims.user_id,
                    email: claims.user_email,
                    token,
                });
                Box::pin(self.service.call(req))
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Auth failed: invalid or expired token");
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}
