//! Domain types and services, free of transport concerns.
//!
//! Inbound adapters resolve identities and map failures through the response
//! envelope; everything behind the ports in [`ports`] is an external
//! collaborator.

pub mod auth;
pub mod error;
pub mod ground;
pub mod ports;
pub mod user;

pub use auth::AuthResolver;
pub use error::{DomainError, ErrorCode};
pub use ground::{Ground, GroundMembership};
pub use user::{Nickname, NicknameValidationError, PersonalAccessToken, User, UserPatch};
