//! Connection tokens.
//!
//! A token is base64-encoded JSON that carries, among other connection
//! details, the repository password. Handing someone a token lets them connect
//! without typing the password.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::CredentialError;

const TOKEN_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

/// Decoded connection token.
#[derive(Debug)]
pub struct ConnectionToken {
    password: Option<SecretString>,
}

impl ConnectionToken {
    /// Parse a token, accepting URL-safe (padded or not) and standard base64.
    pub fn parse(token: &str) -> Result<Self, CredentialError> {
        let token = token.trim();
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .or_else(|_| URL_SAFE.decode(token))
            .or_else(|_| STANDARD.decode(token))
            .map_err(|e| CredentialError::InvalidToken(format!("not base64: {e}")))?;

        let payload: TokenPayload = serde_json::from_slice(&bytes)
            .map_err(|e| CredentialError::InvalidToken(format!("malformed payload: {e}")))?;

        if payload.version != TOKEN_VERSION {
            return Err(CredentialError::InvalidToken(format!(
                "unsupported version {:?}",
                payload.version
            )));
        }

        Ok(Self {
            password: payload.password.map(SecretString::from),
        })
    }

    /// Build a token carrying `password`.
    pub fn encode(password: &SecretString) -> String {
        let payload = TokenPayload {
            version: TOKEN_VERSION.to_string(),
            password: Some(password.expose_secret().to_string()),
        };
        // Serializing two strings cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Password embedded in the token, if any.
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    pub fn into_password(self) -> Option<SecretString> {
        self.password
    }
}
