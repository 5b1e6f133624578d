//! Repository password resolution.
//!
//! Sources are consulted in a fixed order and the first match wins:
//!
//! 1. the password carried by a connection token,
//! 2. a persisted password (existing repositories only, when allowed),
//! 3. an explicit password from `--password` / `REPOKEY_PASSWORD`,
//! 4. interactive entry, with confirmation for new repositories.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::prompt::{PasswordInput, PasswordPrompter};
use super::{CredentialError, PasswordPersistence};

/// Where a resolved password came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    Token,
    Persisted,
    Explicit,
    Prompted,
}

/// Process-wide inputs to password resolution, built once at startup.
#[derive(Debug)]
pub struct ResolverConfig {
    /// Absolute path of the repository config file.
    pub config_file: PathBuf,
    /// Local user the persisted password belongs to.
    pub username: String,
    /// Password supplied non-interactively (flag or environment).
    pub explicit_password: Option<SecretString>,
    password_from_token: OnceLock<SecretString>,
}

impl ResolverConfig {
    pub fn new(config_file: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self {
            config_file: config_file.into(),
            username: username.into(),
            explicit_password: None,
            password_from_token: OnceLock::new(),
        }
    }

    pub fn with_explicit_password(mut self, password: Option<SecretString>) -> Self {
        self.explicit_password = password;
        self
    }

    /// Record the password obtained from a connection token.
    ///
    /// Can be called once per process; later calls fail.
    pub fn set_password_from_token(&self, password: SecretString) -> Result<(), CredentialError> {
        self.password_from_token
            .set(password)
            .map_err(|_| CredentialError::TokenAlreadySet)
    }

    pub fn password_from_token(&self) -> Option<&SecretString> {
        self.password_from_token
            .get()
            .filter(|p| !p.expose_secret().is_empty())
    }

    fn explicit_password_trimmed(&self) -> Option<SecretString> {
        let password = self.explicit_password.as_ref()?.expose_secret().trim();
        if password.is_empty() {
            None
        } else {
            Some(SecretString::from(password.to_string()))
        }
    }
}

/// Resolves the repository password from the configured sources.
pub struct CredentialResolver<I> {
    config: ResolverConfig,
    persistence: PasswordPersistence,
    prompter: PasswordPrompter<I>,
}

impl<I: PasswordInput> CredentialResolver<I> {
    pub fn new(
        config: ResolverConfig,
        persistence: PasswordPersistence,
        prompter: PasswordPrompter<I>,
    ) -> Self {
        Self {
            config,
            persistence,
            prompter,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn config_file(&self) -> &Path {
        &self.config.config_file
    }

    pub fn persistence(&self) -> &PasswordPersistence {
        &self.persistence
    }

    pub fn prompter(&self) -> &PasswordPrompter<I> {
        &self.prompter
    }

    /// Resolve the password for the configured repository.
    pub fn resolve(
        &mut self,
        is_new: bool,
        allow_persistent: bool,
    ) -> Result<SecretString, CredentialError> {
        self.resolve_with_source(is_new, allow_persistent)
            .map(|(password, _)| password)
    }

    /// Like [`resolve`](Self::resolve), also reporting which source matched.
    pub fn resolve_with_source(
        &mut self,
        is_new: bool,
        allow_persistent: bool,
    ) -> Result<(SecretString, SecretSource), CredentialError> {
        if let Some(token) = self.config.password_from_token() {
            tracing::debug!("using password provided via token");
            let password = SecretString::from(token.expose_secret().to_string());
            return Ok((password, SecretSource::Token));
        }

        if !is_new && allow_persistent {
            if let Some(password) = self
                .persistence
                .load(&self.config.config_file, &self.config.username)
            {
                return Ok((password, SecretSource::Persisted));
            }
        }

        if let Some(password) = self.config.explicit_password_trimmed() {
            return Ok((password, SecretSource::Explicit));
        }

        let password = if is_new {
            self.prompter.collect_with_confirmation()?
        } else {
            self.prompter.collect_existing()?
        };
        Ok((password, SecretSource::Prompted))
    }

    /// Persist `password` for the configured repository.
    pub fn remember(&self, password: &SecretString) -> Result<(), CredentialError> {
        self.persistence
            .save(&self.config.config_file, &self.config.username, password)?;
        Ok(())
    }

    /// Erase any persisted password for the configured repository.
    pub fn forget(&self) {
        self.persistence
            .forget(&self.config.config_file, &self.config.username);
    }
}
