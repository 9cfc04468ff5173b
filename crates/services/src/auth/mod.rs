//! Credentials and sessions: argon2 password hashes and a JWT access/refresh pair.

mod password;
mod token;

use bson::oid::ObjectId;
use retreats_config::AuthSettings;
use retreats_db::models::Role;
use thiserror::Error;

pub use token::{Claims, TokenKind, TokenPair};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Password hash error: {0}")]
    HashError(String),
}

pub struct AuthService {
    tokens: token::TokenIssuer,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            tokens: token::TokenIssuer::new(settings),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        password::hash(password)
    }

    /// Fails with `InvalidCredentials` on mismatch.
    pub fn check_password(&self, password: &str, stored_hash: &str) -> Result<(), AuthError> {
        if password::matches(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn issue_tokens(
        &self,
        user_id: ObjectId,
        email: &str,
        role: Role,
    ) -> Result<TokenPair, AuthError> {
        self.tokens.issue_pair(user_id, email, role)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.decode(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.decode(token, TokenKind::Refresh)
    }
}
