//! Domain-level failure taxonomy.
//!
//! Every failure a request can produce is one of four kinds; the inbound
//! adapter maps them to response envelopes through a fixed status table.
//! Raw port errors never reach the transport boundary.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Failure category carried by [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed upload or invalid request parameters.
    BadInput,
    /// Missing, malformed, or expired access token.
    Unauthorized,
    /// Unknown user or missing sub-resource.
    NotFound,
    /// Unexpected fault in a downstream collaborator.
    Internal,
}

impl ErrorCode {
    /// Numeric status reported in the envelope and mirrored on the transport.
    pub const fn status(self) -> u16 {
        match self {
            Self::BadInput => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 406,
            Self::Internal => 500,
        }
    }

    /// Fallback message used when a failure carries no text of its own.
    const fn default_message(self) -> &'static str {
        match self {
            Self::BadInput => "잘못된 요청입니다",
            Self::Unauthorized => "access token 오류",
            Self::NotFound => "존재하지 않는 사용자 혹은 리소스입니다",
            Self::Internal => "내부 오류",
        }
    }
}

/// Typed failure produced by the auth resolver or a business operation.
///
/// ## Invariants
/// - `message` is always populated; blank input falls back to the code's
///   default label so no envelope ever leaves without a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
}

impl DomainError {
    /// Build a failure of the given kind.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Convenience constructor for [`ErrorCode::BadInput`].
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadInput, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message surfaced in the envelope.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::BadInput, 400)]
    #[case(ErrorCode::Unauthorized, 401)]
    #[case(ErrorCode::NotFound, 406)]
    #[case(ErrorCode::Internal, 500)]
    fn status_table_is_fixed(#[case] code: ErrorCode, #[case] status: u16) {
        assert_eq!(code.status(), status);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_messages_fall_back_to_code_label(#[case] message: &str) {
        let err = DomainError::new(ErrorCode::Internal, message);
        assert_eq!(err.message(), "내부 오류");
    }

    #[rstest]
    fn message_is_preserved() {
        let err = DomainError::not_found("존재하지 않는 사용자입니다.");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "존재하지 않는 사용자입니다.");
    }
}
