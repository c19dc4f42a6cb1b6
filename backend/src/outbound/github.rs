//! GitHub OAuth gateway.
//!
//! Talks to GitHub's OAuth endpoints when an account is unlinked: the
//! authorisation code handed back by the frontend is exchanged for an access
//! token, and the application grant for that token is revoked so the user can
//! re-authorise from scratch later.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{GithubGateway, GithubGatewayError};

const EXCHANGE_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("backend/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// [`GithubGateway`] over the public GitHub OAuth API.
pub struct GithubOauthGateway {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    /// Base URL for the REST API, overridable for tests.
    api_base: String,
    /// URL of the code-exchange endpoint, overridable for tests.
    exchange_url: String,
}

impl GithubOauthGateway {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: API_BASE_URL.to_owned(),
            exchange_url: EXCHANGE_URL.to_owned(),
        }
    }

    /// Point the gateway at a different GitHub host.
    pub fn with_base_urls(
        mut self,
        exchange_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.exchange_url = exchange_url.into();
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl GithubGateway for GithubOauthGateway {
    async fn exchange_code(&self, code: &str) -> Result<String, GithubGatewayError> {
        let response = self
            .client
            .post(&self.exchange_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|error| GithubGatewayError::transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubGatewayError::transport(format!(
                "code 교환 응답 코드 {status}"
            )));
        }

        let body: ExchangeResponse = response
            .json()
            .await
            .map_err(|error| GithubGatewayError::transport(error.to_string()))?;

        match body.access_token {
            Some(token) => Ok(token),
            // GitHub reports invalid codes with 200 and an error payload.
            None => Err(GithubGatewayError::rejected(
                body.error_description
                    .or(body.error)
                    .unwrap_or_else(|| "code 교환에 실패했습니다".to_owned()),
            )),
        }
    }

    async fn revoke(&self, access_token: &str) -> Result<(), GithubGatewayError> {
        let url = format!("{}/applications/{}/grant", self.api_base, self.client_id);
        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&serde_json::json!({ "access_token": access_token }))
            .send()
            .await
            .map_err(|error| GithubGatewayError::transport(error.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            debug!("revoked github application grant");
            return Ok(());
        }
        if status.is_client_error() {
            return Err(GithubGatewayError::rejected(format!(
                "grant 철회가 거부되었습니다 ({status})"
            )));
        }
        Err(GithubGatewayError::transport(format!(
            "grant 철회 응답 코드 {status}"
        )))
    }
}
