//! Password file backend.
//!
//! Stores the password base64-encoded in `<config file>.repokey-password`,
//! readable only by the owning user.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use super::encoding::{decode_secret, encode_secret};
use super::item_id::password_file_path;
use super::{BackendError, SecretBackend};

/// Secret backend that keeps the password in a file next to the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordFileBackend;

impl PasswordFileBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SecretBackend for PasswordFileBackend {
    fn name(&self) -> &'static str {
        "password file"
    }

    fn get(
        &self,
        config_file: &Path,
        _username: &str,
    ) -> Result<Option<SecretString>, BackendError> {
        let path = password_file_path(config_file);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "unreadable password file");
                }
                return Ok(None);
            }
        };

        match decode_secret(&content) {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring corrupted password file");
                Ok(None)
            }
        }
    }

    fn set(
        &self,
        config_file: &Path,
        _username: &str,
        secret: &SecretString,
    ) -> Result<(), BackendError> {
        let path = password_file_path(config_file);
        tracing::info!("Saving password to file {}.", path.display());

        write_private(&path, &encode_secret(secret.expose_secret()))
            .map_err(|source| BackendError::Io { path, source })
    }

    fn delete(&self, config_file: &Path, _username: &str) -> Result<bool, BackendError> {
        let path = password_file_path(config_file);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(BackendError::Io { path, source }),
        }
    }
}

/// Overwrite `path` with `contents`, restricting access to the owner.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;

    // `mode` only applies on creation; tighten a pre-existing file as well.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
