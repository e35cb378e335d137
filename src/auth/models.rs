// Account data models and request/response DTOs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::error::AuthError;

/// Longest password accepted at signup, in characters
pub const MAX_PASSWORD_CHARS: usize = 1024;

/// Account database model
#[derive(Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// The hash must never reach a log line
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Canonical form used for every store lookup and insert
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Body of both `POST /auth/signup` and `POST /auth/signin`
///
/// Fields are optional so a missing field becomes `MISSING_FIELDS`
/// rather than a deserialization failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    #[schema(example = "secret1")]
    pub password: Option<String>,
}

/// Credentials that passed the presence check
#[derive(Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 1024))]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl TryFrom<CredentialsRequest> for Credentials {
    type Error = AuthError;

    fn try_from(request: CredentialsRequest) -> Result<Self, Self::Error> {
        let email = request
            .email
            .map(|e| normalize_email(&e))
            .filter(|e| !e.is_empty());
        let password = request.password.filter(|p| !p.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(AuthError::MissingFields),
        }
    }
}

/// Public view of an account; never carries the hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    #[schema(example = "a@x.com")]
    pub email: String,
}

/// Response of signup and signin
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Response of `GET /auth/me`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserView,
}
