//! JWT-backed token lookup.
//!
//! Verifies HS256 access tokens and resolves their subject (the GitHub
//! account id) through the user directory. This adapter owns token-format
//! details only; what a verification failure means for the caller is decided
//! by the auth resolver.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::domain::ports::{TokenLookup, TokenLookupError, UserDirectory};

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// GitHub account id of the token holder.
    pub sub: String,
    /// Expiry as a Unix timestamp; enforced during decoding.
    pub exp: usize,
}

/// Token lookup decoding HS256 JWTs and resolving users by GitHub id.
pub struct JwtTokenLookup {
    decoding_key: DecodingKey,
    validation: Validation,
    directory: Arc<dyn UserDirectory>,
}

impl JwtTokenLookup {
    /// Build a lookup validating tokens signed with `secret`.
    pub fn new(secret: &[u8], directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            directory,
        }
    }
}

#[async_trait]
impl TokenLookup for JwtTokenLookup {
    async fn find(&self, token: &str) -> Result<Option<User>, TokenLookupError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| TokenLookupError::invalid_token(error.to_string()))?
            .claims;

        let github_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| TokenLookupError::invalid_token("sub 클레임이 올바르지 않습니다"))?;

        self.directory
            .find_by_github_id(github_id)
            .await
            .map_err(|error| TokenLookupError::backend(error.to_string()))
    }
}
