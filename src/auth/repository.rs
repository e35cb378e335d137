// Account persistence

use std::{future::Future, sync::Arc};

use axum::async_trait;
use uuid::Uuid;

use crate::{
    auth::{error::AuthError, models::Account},
    db::ConnectionManager,
};

/// Persistent record of accounts
///
/// Implementations must reject a second account with the same email with
/// [`AuthError::DuplicateAccount`], even when two creates race.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by its (already normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Fetch only the email of the account with `id`
    async fn find_email_by_id(&self, id: Uuid) -> Result<Option<String>, AuthError>;

    /// Create an account, assigning its id and creation time
    async fn create(&self, email: &str, password_hash: &str) -> Result<Account, AuthError>;
}

/// PostgreSQL-backed account store
pub struct PgAccountStore {
    connections: Arc<ConnectionManager>,
}

impl PgAccountStore {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Bound a query by the configured timeout
    async fn timed<T, F>(&self, query: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let timeout = self.connections.query_timeout();
        match tokio::time::timeout(timeout, query).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::Connection(format!(
                "query timed out after {:?}",
                timeout
            ))),
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let pool = self.connections.ensure_connected().await?;

        self.timed(
            sqlx::query_as::<_, Account>(
                "SELECT id, email, password_hash, created_at FROM accounts WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(pool),
        )
        .await
    }

    async fn find_email_by_id(&self, id: Uuid) -> Result<Option<String>, AuthError> {
        let pool = self.connections.ensure_connected().await?;

        self.timed(
            sqlx::query_scalar::<_, String>("SELECT email FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(pool),
        )
        .await
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<Account, AuthError> {
        let pool = self.connections.ensure_connected().await?;

        // unique violations on accounts_email_key become DuplicateAccount
        self.timed(
            sqlx::query_as::<_, Account>(
                "INSERT INTO accounts (id, email, password_hash) VALUES ($1, $2, $3) \
                 RETURNING id, email, password_hash, created_at",
            )
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .fetch_one(pool),
        )
        .await
    }
}

#[cfg(test)]
pub use memory::InMemoryAccountStore;
