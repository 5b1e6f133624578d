#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use repokey::config::{ResolvedConfig, ServerConfig};
use repokey::credentials::{
    CredentialResolver, MemoryBackend, PasswordFileBackend, PasswordPersistence, PasswordPrompter,
    ResolverConfig, ScriptedPasswordInput,
};
use tempfile::TempDir;

/// A repository config path inside a fresh temporary directory.
pub struct TempRepo {
    pub dir: TempDir,
    pub config_file: PathBuf,
}

impl TempRepo {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let config_file = dir.path().join("repository.config");
        Ok(Self { dir, config_file })
    }

    pub fn resolved_config(&self, keyring_enabled: bool) -> ResolvedConfig {
        ResolvedConfig {
            repository_config: self.config_file.clone(),
            username: "alice".to_string(),
            keyring_enabled,
            server: ServerConfig::default(),
        }
    }

    /// Persistence with the keyring replaced by `vault`.
    pub fn persistence(&self, keyring_enabled: bool, vault: &MemoryBackend) -> PasswordPersistence {
        PasswordPersistence::with_backends(
            keyring_enabled,
            Box::new(vault.clone()),
            Box::new(PasswordFileBackend::new()),
        )
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(&self.config_file, "alice")
    }

    pub fn resolver(
        &self,
        config: ResolverConfig,
        persistence: PasswordPersistence,
        inputs: &[&str],
    ) -> CredentialResolver<ScriptedPasswordInput> {
        CredentialResolver::new(
            config,
            persistence,
            PasswordPrompter::new(ScriptedPasswordInput::new(inputs.iter().copied())),
        )
    }
}
