//! Caller identity.
//!
//! Sessions are issued elsewhere; this server only verifies the bearer token
//! (HS256, shared secret) and turns its claims into a [`Principal`].

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Installer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    /// Key used to bucket the caller in the rate limiter.
    pub fn rate_limit_key(&self) -> String {
        format!("user:{}", self.user_id)
    }

    /// Customer-owned lists are only visible to that customer.
    pub fn require_self(&self, user_id: Uuid) -> Result<(), Error> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "You can only access your own data".to_string(),
            ))
        }
    }
}

/// Token claims accepted from the session issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl AuthError {
    fn diagnostics(&self) -> String {
        match self {
            Self::MissingToken => "Missing bearer token".to_string(),
            Self::InvalidToken(msg) => format!("Invalid bearer token: {msg}"),
        }
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        tracing::debug!(reason = %err.diagnostics(), "Rejected bearer token");
        Error::Unauthorized
    }
}

#[derive(Clone)]
pub struct AuthManager {
    key: DecodingKey,
    validation: Validation,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// `Ok(None)` when no Authorization header is present.
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Option<Principal>, AuthError> {
        let Some(authz) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };

        let authz = authz.to_str().map_err(|_| {
            AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
        })?;

        let token = authz
            .strip_prefix("Bearer ")
            .or_else(|| authz.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
            })?;

        self.verify(token).map(Some)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Principal {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Extractor for routes that need a caller. Missing identity is a 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedPrincipal)
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// Attaches the caller's `Principal` when a valid token is presented.
///
/// Requests without a token pass through untouched; a bad token is a 401
/// regardless of the route.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.auth.authenticate_headers(req.headers()) {
        Ok(Some(principal)) => {
            req.extensions_mut().insert::<Principal>(principal);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(err) => Error::from(err).into_response(),
    }
}
