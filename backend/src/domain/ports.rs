//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (token verification, the user directory, profile image storage, the
//! GitHub integration). Each trait exposes strongly typed errors so adapters
//! map their failures into predictable variants; the fixed `From` impls at
//! the bottom are the only place port failures gain an HTTP meaning.

use async_trait::async_trait;
use thiserror::Error;

use super::error::DomainError;
use super::ground::GroundMembership;
use super::user::{PersonalAccessToken, User, UserPatch};

/// Errors surfaced by [`TokenLookup`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenLookupError {
    /// Token failed verification: malformed, expired, or bad signature.
    #[error("access token 오류: {message}")]
    InvalidToken { message: String },
    /// The lookup backend failed independently of the input.
    #[error("token lookup backend failed: {message}")]
    Backend { message: String },
}

impl TokenLookupError {
    /// Helper for verification failures.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Helper for backend faults.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`UserDirectory`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The subject has no stored account.
    #[error("존재하지 않는 사용자입니다.")]
    NoSuchUser,
    /// A sub-resource of the user is missing.
    #[error("존재하지 않는 리소스입니다: {what}")]
    NoSuchResource { what: String },
    /// Storage-level fault.
    #[error("user directory failed: {message}")]
    Backend { message: String },
}

impl DirectoryError {
    /// Helper for missing sub-resources.
    pub fn no_such_resource(what: impl Into<String>) -> Self {
        Self::NoSuchResource { what: what.into() }
    }

    /// Helper for storage faults.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`ProfileImageStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileStoreError {
    /// The user has no stored profile image.
    #[error("존재하지 않는 프로필 사진입니다.")]
    Missing,
    /// Reading or writing the image failed.
    #[error("파일 저장 에러: {message}")]
    Io { message: String },
    /// Any other store fault.
    #[error("profile store failed: {message}")]
    Backend { message: String },
}

impl ProfileStoreError {
    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Helper for store faults.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`GithubGateway`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GithubGatewayError {
    /// GitHub rejected the supplied code or token.
    #[error("github 연동 요청이 거부되었습니다: {message}")]
    Rejected { message: String },
    /// The gateway could not reach GitHub.
    #[error("github 연동 실패: {message}")]
    Transport { message: String },
}

impl GithubGatewayError {
    /// Helper for rejected requests.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// A stored or uploaded profile image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Token-validation and user-lookup collaborator used by the auth resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenLookup: Send + Sync {
    /// Verify `token` and resolve its subject to a stored user.
    ///
    /// Returns `Ok(None)` when the token is valid but the subject has no
    /// account.
    async fn find(&self, token: &str) -> Result<Option<User>, TokenLookupError>;
}

/// Business collaborator for user profile and membership operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user by the GitHub account id carried in token claims.
    async fn find_by_github_id(&self, github_id: i64) -> Result<Option<User>, DirectoryError>;

    /// Apply a partial update and return the updated user.
    async fn update_info(&self, user: &User, patch: UserPatch) -> Result<User, DirectoryError>;

    /// True when another account already uses `nickname`.
    async fn is_nickname_taken(
        &self,
        nickname: &str,
        requester: i32,
    ) -> Result<bool, DirectoryError>;

    /// Store or replace the user's personal access token.
    async fn save_personal_access_token(
        &self,
        user: &User,
        token: PersonalAccessToken,
    ) -> Result<(), DirectoryError>;

    /// Record the ground the user visited last.
    async fn update_last_ground(&self, user: &User, ground_id: i32) -> Result<(), DirectoryError>;

    /// List the grounds the user belongs to.
    async fn grounds(&self, user: &User) -> Result<Vec<GroundMembership>, DirectoryError>;

    /// Clear the status message and return the updated user.
    async fn clear_status_msg(&self, user: &User) -> Result<User, DirectoryError>;

    /// Remove the account entirely.
    async fn remove_user(&self, user: &User) -> Result<(), DirectoryError>;
}

/// Storage collaborator for profile images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileImageStore: Send + Sync {
    /// Load the user's profile image.
    async fn load(&self, user: &User) -> Result<ProfileImage, ProfileStoreError>;

    /// Store or replace the user's profile image.
    async fn save(&self, user: &User, image: ProfileImage) -> Result<(), ProfileStoreError>;

    /// Delete the user's profile image.
    async fn delete(&self, user: &User) -> Result<(), ProfileStoreError>;
}

/// GitHub OAuth collaborator used when unlinking an account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubGateway: Send + Sync {
    /// Exchange an OAuth authorisation code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, GithubGatewayError>;

    /// Revoke the application grant for the given access token.
    async fn revoke(&self, access_token: &str) -> Result<(), GithubGatewayError>;
}

impl From<TokenLookupError> for DomainError {
    fn from(value: TokenLookupError) -> Self {
        match value {
            TokenLookupError::InvalidToken { .. } => Self::unauthorized(value.to_string()),
            TokenLookupError::Backend { .. } => Self::internal(value.to_string()),
        }
    }
}

impl From<DirectoryError> for DomainError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::NoSuchUser | DirectoryError::NoSuchResource { .. } => {
                Self::not_found(value.to_string())
            }
            DirectoryError::Backend { .. } => Self::internal(value.to_string()),
        }
    }
}

impl From<ProfileStoreError> for DomainError {
    fn from(value: ProfileStoreError) -> Self {
        match value {
            ProfileStoreError::Missing => Self::not_found(value.to_string()),
            ProfileStoreError::Io { .. } => Self::bad_input(value.to_string()),
            ProfileStoreError::Backend { .. } => Self::internal(value.to_string()),
        }
    }
}

impl From<GithubGatewayError> for DomainError {
    fn from(value: GithubGatewayError) -> Self {
        match value {
            GithubGatewayError::Rejected { .. } => Self::bad_input(value.to_string()),
            GithubGatewayError::Transport { .. } => Self::internal(value.to_string()),
        }
    }
}
