//! Authentication and authorization for the book-club service.
//!
//! [`Authenticator`] is the process-scoped service injected into every
//! authenticated request: it issues and verifies bearer tokens, consults the
//! revocation list and hashes passwords. [`guard`] holds the checks that
//! protect mutations of the entity graph.

pub mod guard;
pub mod password;
pub mod revocation;
pub mod token;

use bookclub_kernel::settings::AuthSettings;
use thiserror::Error;

pub use guard::{GuardError, Patch, Resource};
pub use password::PasswordHasher;
pub use revocation::RevocationList;
pub use token::{Claims, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Authorization header must use the Bearer scheme")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token lifetime of {0} minutes is out of range")]
    TokenLifetime(u64),
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

pub struct Authenticator {
    tokens: TokenService,
    revoked: RevocationList,
    passwords: PasswordHasher,
}

impl Authenticator {
    pub fn new(tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            tokens,
            revoked: RevocationList::new(),
            passwords,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        let minutes = settings.token_ttl_minutes;
        let ttl = i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .ok_or(AuthError::TokenLifetime(minutes))?;
        let tokens = TokenService::new(settings.jwt_secret.as_bytes(), ttl);
        let passwords = PasswordHasher::new(&settings.password_hash)?;
        Ok(Self::new(tokens, passwords))
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.passwords.hash(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        self.passwords.verify(password, hash)
    }

    pub fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        let (token, claims) = self.tokens.issue(user_id)?;
        tracing::debug!(target: "bookclub-authz", user_id, jti = %claims.jti, "token issued");
        Ok(token)
    }

    /// Verify a bearer token and refuse it if its id has been revoked.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.tokens.verify(token)?;
        if self.revoked.is_revoked(&claims.jti) {
            tracing::debug!(target: "bookclub-authz", jti = %claims.jti, "revoked token presented");
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    pub fn revoke(&self, claims: &Claims) {
        if self.revoked.revoke(&claims.jti) {
            tracing::info!(target: "bookclub-authz", sub = %claims.sub, jti = %claims.jti, "token revoked");
        }
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookclub_kernel::settings::PasswordHashSettings;

    fn authenticator() -> Authenticator {
        let settings = AuthSettings {
            password_hash: PasswordHashSettings::minimal(),
            ..AuthSettings::default()
        };
        Authenticator::from_settings(&settings).unwrap()
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("bearer  abc ")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer")),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn huge_token_lifetime_is_an_error() {
        let settings = AuthSettings {
            token_ttl_minutes: u64::MAX,
            password_hash: PasswordHashSettings::minimal(),
            ..AuthSettings::default()
        };
        assert!(matches!(
            Authenticator::from_settings(&settings),
            Err(AuthError::TokenLifetime(u64::MAX))
        ));
    }

    #[test]
    fn revoked_token_no_longer_authenticates() {
        let auth = authenticator();
        let token = auth.issue_token(9).unwrap();
        let claims = auth.authenticate(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 9);

        auth.revoke(&claims);
        auth.revoke(&claims);
        assert!(matches!(auth.authenticate(&token), Err(AuthError::Revoked)));
        assert_eq!(auth.revocations().len(), 1);
    }

    #[test]
    fn revoking_one_token_leaves_others_valid() {
        let auth = authenticator();
        let first = auth.issue_token(1).unwrap();
        let second = auth.issue_token(1).unwrap();
        auth.revoke(&auth.authenticate(&first).unwrap());
        assert!(auth.authenticate(&second).is_ok());
    }
}
