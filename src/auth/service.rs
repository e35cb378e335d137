// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        AuthResponse, Credentials, CredentialsRequest, SessionResponse, UserView,
        MAX_PASSWORD_CHARS,
    },
    password::{PasswordHasher, DUMMY_HASH},
    repository::AccountStore,
    token::TokenService,
};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
        }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, request: CredentialsRequest) -> Result<AuthResponse, AuthError> {
        let credentials = Credentials::try_from(request)?;
        credentials.validate().map_err(|e| {
            debug!("Signup validation failed: {:?}", e);
            if e.field_errors().contains_key("password") {
                AuthError::Validation(format!(
                    "Password must be at most {} characters",
                    MAX_PASSWORD_CHARS
                ))
            } else {
                AuthError::Validation("Email address is not valid".to_string())
            }
        })?;

        debug!("Registering account: {}", credentials.email);

        // Advisory only; the store's unique index settles races
        if self.accounts.find_by_email(&credentials.email).await?.is_some() {
            debug!("Signup rejected, email taken: {}", credentials.email);
            return Err(AuthError::DuplicateAccount);
        }

        let Credentials { email, password } = credentials;
        let password_hash = self.hasher.hash_async(password).await?;
        let account = self.accounts.create(&email, &password_hash).await?;

        let token = self.tokens.issue(account.id)?;
        info!("Created account {} for {}", account.id, account.email);

        Ok(AuthResponse {
            token,
            user: UserView {
                email: account.email,
            },
        })
    }

    /// Check credentials and issue a session token
    pub async fn authenticate(
        &self,
        request: CredentialsRequest,
    ) -> Result<AuthResponse, AuthError> {
        let Credentials { email, password } = Credentials::try_from(request)?;
        debug!("Sign-in attempt for {}", email);

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            // pay the same hashing cost as a wrong password
            self.hasher
                .verify_async(password, DUMMY_HASH.to_string())
                .await?;
            warn!("Sign-in failed for {}: no such account", email);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify_async(password, account.password_hash.clone())
            .await?;
        if !matches {
            warn!("Sign-in failed for {}: wrong password", email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(account.id)?;
        info!("Account {} signed in", account.id);

        Ok(AuthResponse {
            token,
            user: UserView {
                email: account.email,
            },
        })
    }

    /// Resolve a bearer token to the account it names
    pub async fn resolve_session(&self, token: &str) -> Result<SessionResponse, AuthError> {
        let account_id = self.tokens.verify(token)?;

        let email = self
            .accounts
            .find_email_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        debug!("Resolved session for account {}", account_id);
        Ok(SessionResponse {
            user: UserView { email },
        })
    }
}
