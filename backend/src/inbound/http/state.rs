//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::AuthResolver;
use crate::domain::ports::{GithubGateway, ProfileImageStore, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub resolver: AuthResolver,
    pub directory: Arc<dyn UserDirectory>,
    pub profiles: Arc<dyn ProfileImageStore>,
    pub github: Arc<dyn GithubGateway>,
}

impl HttpState {
    /// Bundle the port implementations used by the user endpoints.
    pub fn new(
        resolver: AuthResolver,
        directory: Arc<dyn UserDirectory>,
        profiles: Arc<dyn ProfileImageStore>,
        github: Arc<dyn GithubGateway>,
    ) -> Self {
        Self {
            resolver,
            directory,
            profiles,
            github,
        }
    }
}
