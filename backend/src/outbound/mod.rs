//! Outbound adapters implementing the domain ports.

pub mod github;
pub mod jwt;
pub mod memory;
pub mod profile;
