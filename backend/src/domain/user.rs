//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use zeroize::Zeroizing;

/// Validation errors returned by [`Nickname::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NicknameValidationError {
    /// Nickname was missing or blank once trimmed.
    #[error("닉네임은 비어 있을 수 없습니다")]
    Empty,
    /// Nickname exceeds the allowed length.
    #[error("닉네임은 최대 {max}자까지 가능합니다")]
    TooLong { max: usize },
}

/// Maximum allowed length for a nickname.
pub const NICKNAME_MAX: usize = 20;

/// Validated nickname shown to other ground members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Validate and construct a [`Nickname`] from raw input.
    pub fn new(nickname: impl Into<String>) -> Result<Self, NicknameValidationError> {
        let trimmed = nickname.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(NicknameValidationError::Empty);
        }
        if trimmed.chars().count() > NICKNAME_MAX {
            return Err(NicknameValidationError::TooLong { max: NICKNAME_MAX });
        }
        Ok(Self(trimmed))
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = NicknameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Resolved user identity, valid for one request.
///
/// Produced by the auth resolver from an access token; the request pipeline
/// only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable account identifier.
    #[schema(example = 7)]
    pub id: i32,
    /// Linked GitHub account id, the token subject.
    #[schema(example = 583_231)]
    pub github_id: i64,
    #[schema(value_type = String, example = "개발왕")]
    pub nickname: Nickname,
    /// Free-form status message, absent when never set or deleted.
    pub status_msg: Option<String>,
    /// Ground the user last visited.
    pub last_ground_id: Option<i32>,
}

/// Partial update applied to a user's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub nickname: Option<Nickname>,
    pub status_msg: Option<String>,
}

impl UserPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.status_msg.is_none()
    }
}

/// User-supplied credential for the GitHub integration, stored per user.
///
/// The raw value is zeroised on drop and never logged; operational logging
/// uses the SHA-256 [`fingerprint`](Self::fingerprint) instead.
#[derive(Clone)]
pub struct PersonalAccessToken(Zeroizing<String>);

impl PersonalAccessToken {
    /// Wrap a raw token, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(raw)))
    }

    /// Raw token value for forwarding to the integration.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated SHA-256 fingerprint, safe for logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PersonalAccessToken")
            .field(&self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn nickname_rejects_blank(#[case] raw: &str) {
        assert_eq!(Nickname::new(raw), Err(NicknameValidationError::Empty));
    }

    #[rstest]
    fn nickname_rejects_overlong() {
        let raw = "a".repeat(NICKNAME_MAX + 1);
        assert_eq!(
            Nickname::new(raw),
            Err(NicknameValidationError::TooLong { max: NICKNAME_MAX })
        );
    }

    #[rstest]
    #[case("  개발왕  ", "개발왕")]
    #[case("ada", "ada")]
    fn nickname_trims_surrounding_whitespace(#[case] raw: &str, #[case] expected: &str) {
        let nickname = Nickname::new(raw).expect("valid nickname");
        assert_eq!(nickname.as_ref(), expected);
    }

    #[rstest]
    fn user_serialises_camel_case() {
        let user = User {
            id: 1,
            github_id: 42,
            nickname: Nickname::new("ada").expect("valid nickname"),
            status_msg: None,
            last_ground_id: Some(3),
        };
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(value["githubId"], 42);
        assert_eq!(value["statusMsg"], serde_json::Value::Null);
        assert_eq!(value["lastGroundId"], 3);
    }

    #[rstest]
    fn personal_access_token_rejects_blank() {
        assert!(PersonalAccessToken::new("  ").is_none());
    }

    #[rstest]
    fn personal_access_token_debug_hides_value() {
        let token = PersonalAccessToken::new("ghp_secret").expect("non-empty token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains(&token.fingerprint()));
    }

    #[rstest]
    fn fingerprint_is_deterministic_hex() {
        let token = PersonalAccessToken::new("ghp_secret").expect("non-empty token");
        let fp = token.fingerprint();
        assert_eq!(fp, token.fingerprint());
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
