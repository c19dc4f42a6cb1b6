//! Access-token resolution.
//!
//! Turns the raw `Authorization` header value into a resolved [`User`] or a
//! typed failure. Resolution is a pure lookup: it mutates no session or user
//! state and never panics for any string input.

use std::sync::Arc;

use super::error::DomainError;
use super::ports::{TokenLookup, TokenLookupError};
use super::user::User;

/// Scheme prefix accepted (and stripped) on the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Resolves identities from raw bearer-token strings.
#[derive(Clone)]
pub struct AuthResolver {
    lookup: Arc<dyn TokenLookup>,
}

impl AuthResolver {
    /// Build a resolver over the given token-lookup collaborator.
    pub fn new(lookup: Arc<dyn TokenLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve the `Authorization` header value to a user.
    ///
    /// Failure mapping:
    /// - missing/blank header or verification failure → `Unauthorized`
    /// - valid token whose subject has no account → `NotFound`
    /// - lookup backend fault → `Internal`
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<User, DomainError> {
        let raw = authorization
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DomainError::unauthorized("access token 오류: 토큰이 없습니다"))?;

        let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(DomainError::unauthorized(
                "access token 오류: 토큰이 비어 있습니다",
            ));
        }

        match self.lookup.find(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(DomainError::not_found("존재하지 않는 사용자입니다.")),
            Err(error @ TokenLookupError::InvalidToken { .. }) => {
                Err(DomainError::unauthorized(error.to_string()))
            }
            Err(error @ TokenLookupError::Backend { .. }) => {
                Err(DomainError::internal(error.to_string()))
            }
        }
    }
}
