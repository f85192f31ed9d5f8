//! Identity service client
//!
//! Resolves caller bearer tokens to user identities. The proxy treats the
//! identity service as an opaque check: any failure to resolve the token
//! is an authentication failure.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::utils::error::{AppError, AppResult};

/// Identity resolved for an authenticated caller
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable user identifier
    pub id: String,
    /// Account email (optional)
    #[serde(default)]
    pub email: Option<String>,
}

/// HTTP client for the identity service
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    config: IdentityConfig,
}

impl IdentityClient {
    /// Create a new client instance
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.config.base_url.trim_end_matches('/'))
    }

    /// Resolve a bearer token to a user identity
    pub async fn verify_token(&self, token: &str) -> AppResult<AuthenticatedUser> {
        debug!("Verifying caller session token");

        let response = self
            .client
            .get(self.user_url())
            .header("Authorization", format!("Bearer {}", token))
            .header("apikey", &self.config.anon_key)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity service unreachable: {}", e);
                AppError::Authentication("Identity service unreachable".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Authentication(format!(
                "Session token rejected ({})",
                status
            )));
        }

        let user: AuthenticatedUser = response.json().await.map_err(|_| {
            AppError::Authentication("Invalid identity service response".to_string())
        })?;

        if user.id.is_empty() {
            return Err(AppError::Authentication(
                "Identity service returned no user".to_string(),
            ));
        }

        debug!("Session verified for user: {}", user.id);
        Ok(user)
    }
}
