// JWT token generation and validation service

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub iat: i64,
    /// Absent on non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Issues and verifies signed session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Option<Duration>,
}

impl TokenService {
    /// Create a TokenService signing with `secret`
    ///
    /// `ttl` of `None` issues tokens without an `exp` claim.
    pub fn new(secret: &str, ttl: Option<Duration>) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::Configuration("JWT_SECRET not configured".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Issue a token for `account_id` using the configured lifetime
    pub fn issue(&self, account_id: Uuid) -> Result<String, AuthError> {
        self.issue_with_ttl(account_id, self.ttl)
    }

    /// Issue a token with an explicit lifetime
    pub fn issue_with_ttl(
        &self,
        account_id: Uuid,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = ttl.map(|ttl| now.saturating_add(ttl.as_secs().min(i64::MAX as u64) as i64));

        let claims = Claims {
            sub: account_id.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify a token and return the account id it names
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode_claims(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked when present; its absence means the token never expires
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEVEN_DAYS: Duration = Duration::from_secs(604_800);

    // Helper to create a test token service
    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes", Some(SEVEN_DAYS)).unwrap()
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        assert!(matches!(
            TokenService::new("", Some(SEVEN_DAYS)),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            TokenService::new("  ", None),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let service = test_token_service();
        let id = Uuid::new_v4();
        let token = service.issue(id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_token_expiration_is_seven_days() {
        let service = test_token_service();
        let token = service.issue(Uuid::new_v4()).unwrap();
        let claims = service.decode_claims(&token).unwrap();
        assert_eq!(claims.exp.unwrap() - claims.iat, 604_800);
    }

    #[test]
    fn test_non_expiring_token_has_no_exp_claim() {
        let service = TokenService::new("test_secret_key_for_testing_purposes", None).unwrap();
        let id = Uuid::new_v4();
        let token = service.issue(id).unwrap();

        assert!(service.decode_claims(&token).unwrap().exp.is_none());
        assert_eq!(service.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp() - 1000,
            exp: Some(Utc::now().timestamp() - 500), // Expired 500 seconds ago
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_short_lived_token_expires() {
        let service = test_token_service();
        let id = Uuid::new_v4();
        let token = service
            .issue_with_ttl(id, Some(Duration::from_secs(1)))
            .unwrap();

        assert_eq!(service.verify(&token).unwrap(), id);
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert!(matches!(service.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.verify("").is_err());
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("invalid_token_format").is_err());
        assert!(service
            .verify("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1", Some(SEVEN_DAYS)).unwrap();
        let service2 = TokenService::new("secret2", Some(SEVEN_DAYS)).unwrap();

        let token = service1.issue(Uuid::new_v4()).unwrap();

        assert!(service1.verify(&token).is_ok());
        assert!(matches!(service2.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = test_token_service();
        let token = service.issue(Uuid::new_v4()).unwrap();
        let other = service.issue(Uuid::new_v4()).unwrap();

        // splice another token's payload under the first token's signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(service.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let service = test_token_service();
        let claims = Claims {
            sub: "42".to_string(),
            iat: Utc::now().timestamp(),
            exp: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::InvalidToken)));
    }

    // Property-based tests using proptest

    proptest! {
        #[test]
        fn prop_issued_tokens_verify_to_their_subject(bytes in any::<[u8; 16]>()) {
            let service = test_token_service();
            let id = Uuid::from_bytes(bytes);
            let token = service.issue(id)?;
            prop_assert_eq!(service.verify(&token)?, id);
        }

        #[test]
        fn prop_random_strings_rejected(malformed in "[a-zA-Z0-9._-]{0,120}") {
            let service = test_token_service();
            prop_assert!(service.verify(&malformed).is_err());
        }
    }
}
