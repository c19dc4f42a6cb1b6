//! Access-token extraction from the `Authorization` header.
//!
//! Extraction never fails: a missing or non-ASCII header yields an empty
//! token and the auth resolver decides what that means. Handlers therefore
//! always reach the pipeline and every outcome flows through the envelope
//! mapper.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{Ready, ready};

/// Raw `Authorization` header value captured for the auth resolver.
#[derive(Debug, Clone, Default)]
pub struct AccessToken(Option<String>);

impl AccessToken {
    /// Wrap a raw header value; used directly by tests.
    pub fn new(raw: Option<String>) -> Self {
        Self(raw)
    }

    /// Header value as supplied by the client, if any.
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for AccessToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        ready(Ok(Self(raw)))
    }
}
