/*!
 * # Authentication and Authorization Module
 *
 * Email/password accounts are exchanged for signed bearer tokens. Clients
 * treat the token as opaque; the server resolves it back to a still-active
 * account on every request, so deactivating a user revokes their tokens.
 *
 * Route protection comes in two levels:
 *
 * - `with_auth` - any active account
 * - `with_staff` - staff or superuser accounts only
 */

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::repositories::UserRepository;

pub mod password;
pub mod user;

pub use password::{hash_password, validate_password, verify_password};
pub use user::normalize_email;

/// Claim structure for bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub jti: String, // Token ID
    pub iat: i64,    // Issued at time
    pub exp: i64,    // Expiration time
    pub nbf: i64,    // Not valid before time
    pub iss: String, // Issuer
    pub aud: String, // Audience
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("User inactive or deleted")]
    InactiveUser,

    #[error("You do not have permission to perform this action")]
    InsufficientPermissions,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::InactiveUser => ServiceError::Unauthorized(err.to_string()),
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::TokenError(msg),
            AuthError::Internal(msg) => ServiceError::InternalError(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// Issues and resolves bearer tokens for user accounts
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish()
    }
}

impl AuthService {
    pub fn new(config: AuthConfig, users: Arc<dyn UserRepository>) -> Self {
        Self { config, users }
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Check an email/password pair and record the login.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let rejected =
            || ServiceError::AuthenticationError("Unable to authenticate with provided credentials".to_string());

        if email.trim().is_empty() || password.is_empty() {
            return Err(rejected());
        }

        let account = match self.users.find_by_email(email).await? {
            Some(account) => account,
            None => {
                debug!("login attempt for unknown account");
                return Err(rejected());
            }
        };

        if !account.is_active || !account.check_password(password) {
            warn!(user_id = %account.id, "login rejected");
            return Err(rejected());
        }

        let mut active = account.into_active_model();
        active.last_login = Set(Some(Utc::now()));
        let account = self.users.update(active).await?;

        info!(user_id = %account.id, "user authenticated");
        Ok(account)
    }

    /// Sign a bearer token bound to `account`.
    pub fn issue_token(&self, account: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::Internal("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: account.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Resolve a bearer token to the active account it was issued for.
    pub async fn validate_token(&self, token: &str) -> Result<user::Model, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let account = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InactiveUser)?;

        if !account.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok(account)
    }
}

/// The account behind the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }

        let auth_service = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| AuthError::Internal("Authentication service not available".into()))?;

        let current = extract_auth_from_headers(&parts.headers, &auth_service).await?;
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Authentication middleware that resolves the bearer token into a [`CurrentUser`]
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::Internal("Authentication service not available".into())
                .into_response()
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service).await {
        Ok(current) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Staff middleware; must run inside [`auth_middleware`]
pub async fn staff_middleware(request: Request, next: Next) -> Result<Response, AuthError> {
    let allowed = match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(account)) => account.can_access_admin(),
        None => return Err(AuthError::MissingToken),
    };

    if !allowed {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<CurrentUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    auth_service.validate_token(token).await.map(CurrentUser)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_staff(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_staff(self) -> Self {
        self.layer(axum::middleware::from_fn(staff_middleware))
            .with_auth()
    }
}
