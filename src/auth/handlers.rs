// HTTP handlers for authentication endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::{
    error::{AuthError, ErrorBody},
    middleware::BearerToken,
    models::{AuthResponse, CredentialsRequest, SessionResponse},
    service::AuthService,
};

fn json_body(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, AuthError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AuthError::Validation("Request body must be a JSON object".to_string())
    })
}

/// Register a new account
/// POST /auth/signup
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, invalid input, or email taken", body = ErrorBody, example = json!({"error": "EMAIL_EXISTS", "message": "Email already exists"})),
        (status = 500, description = "Internal server error", body = ErrorBody, example = json!({"error": "SERVER_ERROR", "message": "Internal server error"}))
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let request = json_body(payload)?;
    let response = service.register(request).await?;
    Ok(Json(response))
}

/// Sign in with email and password
/// POST /auth/signin
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorBody, example = json!({"error": "MISSING_FIELDS", "message": "Email and password are required"})),
        (status = 401, description = "Unknown email or wrong password", body = ErrorBody, example = json!({"error": "INVALID_CREDENTIALS", "message": "Invalid email or password"})),
        (status = 500, description = "Internal server error", body = ErrorBody, example = json!({"error": "SERVER_ERROR", "message": "Internal server error"}))
    ),
    tag = "auth"
)]
pub async fn signin_handler(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let request = json_body(payload)?;
    let response = service.authenticate(request).await?;
    Ok(Json(response))
}

/// Get the account behind a session token
/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Session is valid", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired token, or account gone", body = ErrorBody, example = json!({"error": "INVALID_TOKEN", "message": "Invalid token"}))
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(service): State<Arc<AuthService>>,
    BearerToken(token): BearerToken,
) -> Result<Json<SessionResponse>, AuthError> {
    let response = service.resolve_session(&token).await?;
    Ok(Json(response))
}
