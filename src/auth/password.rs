// Password hashing and verification

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::auth::error::AuthError;

/// Argon2id memory cost in KiB
const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2id iteration count
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Well-formed hash with the same parameters as [`PasswordHasher::hash`]
///
/// Verified against when an email has no account, so that sign-in costs the
/// same whether or not the account exists. No password matches it.
pub const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$\
                              b3BlbnByb21wdHMtZHVtbXktc2FsdA$\
                              AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Salted one-way hashing with a fixed work factor
///
/// Output is a PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
/// verification needs nothing but the stored string.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// A stored hash that does not parse counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`PasswordHasher::hash`] on the blocking pool
    pub async fn hash_async(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// [`PasswordHasher::verify`] on the blocking pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }
}
