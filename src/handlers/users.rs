use super::common::{created_response, json_body, success_response, validate_input};
use crate::{
    auth::{user, CurrentUser},
    errors::{ApiError, ServiceError},
    services::users::ProfileChanges,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "email": "cashier@example.com",
    "password": "testpass123",
    "name": "Test Name"
}))]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: Option<String>,
}

/// Public view of an account; never includes the password
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "cashier@example.com")]
    pub email: String,
    #[schema(example = "Test Name")]
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            email: model.email,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque bearer credential
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/user/create/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Duplicate email or invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "user"
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    validate_input(&payload)?;

    let account = state
        .services
        .users
        .register(&payload.email, &payload.password, Some(payload.name))
        .await?;

    Ok(created_response(UserResponse::from(account)))
}

#[utoipa::path(
    post,
    path = "/user/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "user"
)]
pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;

    let account = state
        .auth
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state
        .auth
        .issue_token(&account)
        .map_err(ServiceError::from)?;

    info!(user_id = %account.id, "token issued");
    Ok(success_response(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/user/me/",
    responses(
        (status = 200, description = "Authenticated user's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn retrieve_me(CurrentUser(account): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(account))
}

#[utoipa::path(
    patch,
    path = "/user/me/",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    validate_input(&payload)?;

    let updated = state
        .services
        .users
        .update_profile(
            account,
            ProfileChanges {
                name: payload.name,
                password: payload.password,
            },
        )
        .await?;

    Ok(success_response(UserResponse::from(updated)))
}

/// Any other verb on the profile endpoint, once the caller is authenticated
async fn profile_method_not_allowed(_current: CurrentUser, method: Method) -> ServiceError {
    ServiceError::MethodNotAllowed(format!("\"{method}\""))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/create/", post(create_user))
        .route("/user/token/", post(create_token))
        .route(
            "/user/me/",
            get(retrieve_me)
                .patch(update_me)
                .fallback(profile_method_not_allowed),
        )
}
