//! Client for the repository server control API.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

/// Request and response body of bodiless control calls.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// Thin client for `<address>/api/v1/...` control endpoints.
#[derive(Debug)]
pub struct ServerClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<SecretString>,
}

impl ServerClient {
    /// Creates a client for the server at `address` with a default HTTP client.
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_client(Client::new(), address)
    }

    /// Creates a client with a custom HTTP client.
    pub fn with_client(client: Client, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            client,
            base_url: format!("{}/api/v1", address.trim_end_matches('/')),
            username: None,
            password: None,
        }
    }

    pub fn from_config(config: &ServerConfig, password: Option<SecretString>) -> Self {
        let mut client = Self::new(&config.address);
        if let Some(username) = &config.username {
            client = client.with_basic_auth(username.clone(), password);
        }
        client
    }

    /// Authenticate every request with HTTP basic auth.
    pub fn with_basic_auth(mut self, username: String, password: Option<SecretString>) -> Self {
        self.username = Some(username);
        self.password = password;
        self
    }

    /// POST `body` to `path` (relative to `/api/v1/`) and decode the JSON reply.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(url = %url, "POST");

        let mut request = self.client.post(&url).json(body);
        if let Some(username) = &self.username {
            request = request.basic_auth(
                username,
                self.password.as_ref().map(|p| p.expose_secret().to_string()),
            );
        }

        let response = request.send().await?.error_for_status()?;
        let reply = response
            .json::<R>()
            .await
            .with_context(|| format!("Invalid response from {url}"))?;
        Ok(reply)
    }

    /// Pause scheduled snapshots for all sources.
    pub async fn pause_sources(&self) -> Result<()> {
        let _: Empty = self.post("sources/pause", &Empty::default()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let client = ServerClient::new("http://localhost:51515/");
        assert_eq!(client.base_url, "http://localhost:51515/api/v1");
    }

    #[test]
    fn test_from_config_without_username_skips_auth() {
        let client = ServerClient::from_config(&ServerConfig::default(), None);
        assert!(client.username.is_none());
    }
}
