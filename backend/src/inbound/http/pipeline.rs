//! Request pipeline shared by every handler.
//!
//! The repeated resolve-identity → call-operation → map-outcome shape lives
//! here once instead of in each endpoint. Auth failures short-circuit to the
//! mapper without invoking the operation; success and failure alike produce
//! exactly one envelope.

use std::future::Future;

use serde::Serialize;
use tracing::error;

use super::envelope::Envelope;
use super::token::AccessToken;
use crate::domain::{AuthResolver, DomainError, User};

/// Run `op` with the resolved identity in scope and map the outcome.
///
/// The resolved [`User`] is passed explicitly to the operation; nothing is
/// written to the response channel before the envelope is final.
pub async fn authorized<T, F, Fut>(
    resolver: &AuthResolver,
    token: &AccessToken,
    success_message: &str,
    op: F,
) -> Envelope<T>
where
    T: Serialize,
    F: FnOnce(User) -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let outcome = match resolver.resolve(token.value()).await {
        Ok(user) => op(user).await,
        Err(failure) => Err(failure),
    };
    if let Err(failure) = &outcome {
        error!(code = ?failure.code(), message = %failure.message(), "request failed");
    }
    Envelope::from_outcome(outcome, success_message)
}
