//! HTTP server configuration object and helpers.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) profile_image_dir: PathBuf,
    pub(crate) github_client_id: String,
    pub(crate) github_client_secret: String,
}

impl ServerConfig {
    /// Construct a server configuration with explicit values.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        token_secret: impl Into<Vec<u8>>,
        profile_image_dir: impl Into<PathBuf>,
        github_client_id: impl Into<String>,
        github_client_secret: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            token_secret: Zeroizing::new(token_secret.into()),
            profile_image_dir: profile_image_dir.into(),
            github_client_id: github_client_id.into(),
            github_client_secret: github_client_secret.into(),
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// The token secret is read from `AUTH_TOKEN_SECRET_FILE` or
    /// `AUTH_TOKEN_SECRET`; in debug builds (or with
    /// `AUTH_ALLOW_EPHEMERAL_SECRET=1`) a random secret is generated when
    /// neither is set, which invalidates all tokens on restart.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the secret is unavailable in a release
    /// build or the bind address cannot be parsed.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse::<SocketAddr>()
            .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

        let token_secret = read_token_secret()?;

        let profile_image_dir = env::var("PROFILE_IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./profile-images"));

        let github_client_id = env::var("GITHUB_CLIENT_ID").unwrap_or_default();
        let github_client_secret = env::var("GITHUB_CLIENT_SECRET").unwrap_or_default();
        if github_client_id.is_empty() {
            warn!("GITHUB_CLIENT_ID is not set; account unlinking will fail");
        }

        Ok(Self {
            bind_addr,
            token_secret,
            profile_image_dir,
            github_client_id,
            github_client_secret,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn read_token_secret() -> std::io::Result<Zeroizing<Vec<u8>>> {
    if let Ok(path) = env::var("AUTH_TOKEN_SECRET_FILE") {
        return std::fs::read(&path)
            .map(Zeroizing::new)
            .map_err(|e| std::io::Error::other(format!("failed to read secret at {path}: {e}")));
    }
    if let Ok(secret) = env::var("AUTH_TOKEN_SECRET") {
        return Ok(Zeroizing::new(secret.into_bytes()));
    }

    let allow_dev = env::var("AUTH_ALLOW_EPHEMERAL_SECRET").ok().as_deref() == Some("1");
    if cfg!(debug_assertions) || allow_dev {
        warn!("using ephemeral token secret (dev only); tokens will not survive a restart");
        let mut secret = vec![0_u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), secret.as_mut_slice());
        return Ok(Zeroizing::new(secret));
    }
    Err(std::io::Error::other(
        "AUTH_TOKEN_SECRET or AUTH_TOKEN_SECRET_FILE must be set",
    ))
}
