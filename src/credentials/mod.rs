//! Repository password resolution and persistence.
//!
//! A repository is identified by the absolute path of its config file. Its
//! password can be persisted in one of two backends:
//!
//! - the OS keyring, keyed by a [vault item id](vault_item_id) derived from the
//!   config file path and by the local user name;
//! - a base64-encoded file next to the config file
//!   (`<config file>.repokey-password`, owner-only permissions).
//!
//! [`CredentialResolver`] decides which password to use, consulting a
//! connection token, the persisted password, an explicit password and finally
//! the terminal.

mod encoding;
mod error;
mod file;
mod item_id;
mod memory;
mod os_keyring;
mod persistence;
mod prompt;
mod resolver;
mod token;

pub use encoding::{decode_secret, encode_secret, DecodeError};
pub use error::{BackendError, CredentialError};
pub use file::PasswordFileBackend;
pub use item_id::{password_file_path, vault_item_id, PASSWORD_FILE_SUFFIX};
pub use memory::MemoryBackend;
pub use os_keyring::KeyringBackend;
pub use persistence::PasswordPersistence;
#[cfg(feature = "terminal")]
pub use prompt::TerminalPasswordInput;
pub use prompt::{
    PasswordInput, PasswordPrompter, ScriptedPasswordInput, EXISTING_PASSWORD_PROMPT,
    MAX_ATTEMPTS, MISMATCH_MESSAGE, NEW_PASSWORD_PROMPT, VERIFY_PASSWORD_PROMPT,
};
pub use resolver::{CredentialResolver, ResolverConfig, SecretSource};
pub use token::ConnectionToken;

use std::path::Path;

use secrecy::SecretString;

/// A place where a repository password can be persisted.
///
/// Each backend derives its own key from the config file path and user name.
/// A missing entry is not an error: `get` returns `Ok(None)` and `delete`
/// returns `Ok(false)`.
pub trait SecretBackend: Send + Sync {
    /// Short human-readable name used in log messages.
    fn name(&self) -> &'static str;

    fn get(&self, config_file: &Path, username: &str)
        -> Result<Option<SecretString>, BackendError>;

    /// Store `secret`, replacing any previous value.
    fn set(
        &self,
        config_file: &Path,
        username: &str,
        secret: &SecretString,
    ) -> Result<(), BackendError>;

    /// Remove the entry, returning whether one existed.
    fn delete(&self, config_file: &Path, username: &str) -> Result<bool, BackendError>;
}
