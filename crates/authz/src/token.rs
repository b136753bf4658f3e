//! Signed bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthError;

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Token id; the revocation handle.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Numeric user id from the subject claim.
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
        }
    }

    /// Issue a fresh token for `user_id`, returning the encoded token and its claims.
    pub fn issue(&self, user_id: i32) -> Result<(String, Claims), AuthError> {
        let claims = Claims::new(user_id, self.ttl);
        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::minutes(15))
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = service();
        let (token, claims) = tokens.issue(42).unwrap();
        let decoded = tokens.verify(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id().unwrap(), 42);
    }

    #[test]
    fn each_token_gets_a_distinct_jti() {
        let tokens = service();
        let (_, a) = tokens.issue(1).unwrap();
        let (_, b) = tokens.issue(1).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = service().issue(1).unwrap();
        let other = TokenService::new(b"another-secret", Duration::minutes(15));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let mut claims = Claims::new(1, Duration::minutes(15));
        claims.iat -= 3600;
        claims.exp = claims.iat + 60;
        let token = tokens.encode(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let mut claims = Claims::new(1, Duration::minutes(1));
        claims.sub = "alice".to_string();
        assert!(claims.user_id().is_err());
    }
}
