//! Uniform response envelope.
//!
//! Every handler response is a single [`Envelope`] built through
//! [`Envelope::from_outcome`]; there is no other constructor, so no response
//! can bypass the status table. The transport status code mirrors the
//! `status` field.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Wire contract: `{"status": int, "message": string, "data": any|null}`.
///
/// Constructed exactly once per request, immutable afterwards. `data` is
/// serialised as `null` on every failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    #[schema(example = 200)]
    status: u16,
    #[schema(example = "사용자 정보 조회 성공")]
    message: String,
    data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Map an operation outcome into the envelope.
    ///
    /// Success carries the fixed per-operation message and the payload;
    /// every failure kind carries its own message, a `null` payload, and the
    /// status from the fixed table (400/401/406/500).
    pub fn from_outcome(
        outcome: Result<T, DomainError>,
        success_message: impl Into<String>,
    ) -> Self {
        match outcome {
            Ok(data) => Self {
                status: StatusCode::OK.as_u16(),
                message: success_message.into(),
                data: Some(data),
            },
            Err(error) => Self {
                status: error.code().status(),
                message: error.message().to_owned(),
                data: None,
            },
        }
    }

    /// Numeric status mirrored on the transport layer.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable message, populated on success and failure alike.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Payload, present only on success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        // Status values come from the fixed table, so this cannot fall back
        // in practice.
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(&self)
    }
}
