//! OS credential store backend (macOS Keychain, Windows Credential Manager,
//! Linux kernel keyring).

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use super::item_id::vault_item_id;
use super::{BackendError, SecretBackend};

/// Secret backend backed by the platform credential store.
///
/// Entries are keyed by the vault item id of the config file (service) and the
/// local user name (account).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringBackend;

impl KeyringBackend {
    pub fn new() -> Self {
        Self
    }

    fn entry(
        &self,
        config_file: &Path,
        username: &str,
    ) -> Result<::keyring::Entry, BackendError> {
        Ok(::keyring::Entry::new(&vault_item_id(config_file), username)?)
    }
}

impl SecretBackend for KeyringBackend {
    fn name(&self) -> &'static str {
        "OS keyring"
    }

    fn get(
        &self,
        config_file: &Path,
        username: &str,
    ) -> Result<Option<SecretString>, BackendError> {
        match self.entry(config_file, username)?.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(
        &self,
        config_file: &Path,
        username: &str,
        secret: &SecretString,
    ) -> Result<(), BackendError> {
        tracing::debug!("saving password to OS keyring...");
        self.entry(config_file, username)?
            .set_password(secret.expose_secret())?;
        Ok(())
    }

    fn delete(&self, config_file: &Path, username: &str) -> Result<bool, BackendError> {
        match self.entry(config_file, username)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(::keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
