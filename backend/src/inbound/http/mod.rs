//! HTTP inbound adapter exposing REST endpoints.

pub mod envelope;
pub mod health;
pub mod pipeline;
pub mod state;
pub mod token;
pub mod users;

pub use envelope::Envelope;
pub use state::HttpState;
pub use token::AccessToken;
