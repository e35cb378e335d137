// Authentication error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::db::DbError;

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable code such as `EMAIL_EXISTS`
    #[schema(example = "INVALID_CREDENTIALS")]
    pub error: String,
    #[schema(example = "Invalid email or password")]
    pub message: String,
}

/// Every failure an auth operation can surface
///
/// Internal variants carry detail for the server log only; the response body
/// is built from [`AuthError::code`] and [`AuthError::error_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("store unavailable: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("token generation error: {0}")]
    TokenGeneration(String),

    #[error("email and password are required")]
    MissingFields,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("email already exists")]
    DuplicateAccount,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("missing authentication token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    /// The token was valid but its account no longer exists
    #[error("account not found")]
    AccountNotFound,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Configuration(_)
            | AuthError::Database(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::MissingFields | AuthError::Validation(_) | AuthError::DuplicateAccount => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::AccountNotFound => StatusCode::UNAUTHORIZED,
        }
    }

    /// Machine-readable code placed in the `error` field
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Configuration(_)
            | AuthError::Connection(_)
            | AuthError::Database(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_) => "SERVER_ERROR",
            AuthError::MissingFields => "MISSING_FIELDS",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::DuplicateAccount => "EMAIL_EXISTS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "UNAUTHORIZED",
            AuthError::InvalidToken | AuthError::ExpiredToken => "INVALID_TOKEN",
            AuthError::AccountNotFound => "USER_NOT_FOUND",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Configuration(_)
            | AuthError::Database(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_) => "Internal server error".to_string(),
            AuthError::Connection(_) => "Service temporarily unavailable".to_string(),
            AuthError::Validation(msg) => msg.clone(),
            AuthError::MissingFields => "Email and password are required".to_string(),
            AuthError::DuplicateAccount => "Email already exists".to_string(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::MissingToken => "Missing authentication token".to_string(),
            // expired and forged tokens look the same from outside
            AuthError::InvalidToken | AuthError::ExpiredToken => "Invalid token".to_string(),
            AuthError::AccountNotFound => "Account not found".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Configuration(_)
            | AuthError::Connection(_)
            | AuthError::Database(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_) => error!("Auth request failed: {}", self),
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::MissingToken => {
                warn!("Rejected session token: {}", self)
            }
            AuthError::AccountNotFound => warn!("Token subject no longer exists"),
            _ => {}
        }

        let body = Json(ErrorBody {
            error: self.code().to_string(),
            message: self.error_message(),
        });

        (self.status_code(), body).into_response()
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Configuration(msg) => AuthError::Configuration(msg),
            DbError::Connection(msg) => AuthError::Connection(msg),
            DbError::Migration(e) => AuthError::Database(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::DuplicateAccount
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AuthError::Connection(err.to_string())
            }
            other => AuthError::Database(other.to_string()),
        }
    }
}
