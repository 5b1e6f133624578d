//! Saving, loading and forgetting repository passwords.

use std::path::Path;

use secrecy::SecretString;

use super::file::PasswordFileBackend;
use super::os_keyring::KeyringBackend;
use super::{BackendError, SecretBackend};

/// Owns access to persisted repository passwords.
///
/// Exactly one backend is consulted for `load` and `save`, chosen once by the
/// `keyring_enabled` switch. `forget` clears both, since the switch may have
/// been different when the password was saved.
pub struct PasswordPersistence {
    keyring_enabled: bool,
    keyring: Box<dyn SecretBackend>,
    file: Box<dyn SecretBackend>,
}

impl PasswordPersistence {
    /// Persistence over the OS keyring and the password file.
    pub fn new(keyring_enabled: bool) -> Self {
        Self::with_backends(
            keyring_enabled,
            Box::new(KeyringBackend::new()),
            Box::new(PasswordFileBackend::new()),
        )
    }

    /// Persistence over custom backends (tests substitute the keyring).
    pub fn with_backends(
        keyring_enabled: bool,
        keyring: Box<dyn SecretBackend>,
        file: Box<dyn SecretBackend>,
    ) -> Self {
        Self {
            keyring_enabled,
            keyring,
            file,
        }
    }

    pub fn keyring_enabled(&self) -> bool {
        self.keyring_enabled
    }

    fn selected(&self) -> &dyn SecretBackend {
        if self.keyring_enabled {
            self.keyring.as_ref()
        } else {
            self.file.as_ref()
        }
    }

    /// Name of the backend `load` and `save` use.
    pub fn active_backend(&self) -> &'static str {
        self.selected().name()
    }

    /// Look up a persisted password.
    ///
    /// Backend failures are logged and reported as "not found"; a broken
    /// keyring must not stop the caller from prompting instead.
    pub fn load(&self, config_file: &Path, username: &str) -> Option<SecretString> {
        let backend = self.selected();
        match backend.get(config_file, username) {
            Ok(Some(password)) => {
                tracing::debug!(
                    "password for {} retrieved from {}",
                    config_file.display(),
                    backend.name()
                );
                Some(password)
            }
            Ok(None) => {
                tracing::debug!("could not find persisted password");
                None
            }
            Err(e) => {
                tracing::debug!(
                    backend = backend.name(),
                    error = %e,
                    "persisted password lookup failed"
                );
                None
            }
        }
    }

    /// Persist a password in the selected backend.
    ///
    /// Keyring failures are returned as-is rather than falling back to the
    /// password file.
    pub fn save(
        &self,
        config_file: &Path,
        username: &str,
        password: &SecretString,
    ) -> Result<(), BackendError> {
        let backend = self.selected();
        backend.set(config_file, username, password)?;
        tracing::info!("Saved password to {}", backend.name());
        Ok(())
    }

    /// Remove any persisted password from both the keyring and the password file.
    ///
    /// Never fails; problems are logged.
    pub fn forget(&self, config_file: &Path, username: &str) {
        match self.keyring.delete(config_file, username) {
            Ok(true) => {
                tracing::info!("deleted repository password for {}.", config_file.display())
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(
                backend = self.keyring.name(),
                error = %e,
                "unable to delete keyring item for {}",
                config_file.display()
            ),
        }

        if let Err(e) = self.file.delete(config_file, username) {
            tracing::warn!(error = %e, "unable to delete password file");
        }
    }
}
