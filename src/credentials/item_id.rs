//! Identifiers derived from a repository config file path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Suffix appended to the config file path to name the password file.
pub const PASSWORD_FILE_SUFFIX: &str = ".repokey-password";

/// Number of digest bytes kept in a vault item id.
const DIGEST_PREFIX_LEN: usize = 8;

/// Derive the OS keyring service name for a config file.
///
/// The id is `<file name>-<hex of the first 8 bytes of SHA-256(path)>`, so two
/// repositories whose config files share a name still get distinct entries.
pub fn vault_item_id(config_file: &Path) -> String {
    let full = config_file.to_string_lossy();
    let base = config_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());

    let digest = Sha256::digest(full.as_bytes());
    let prefix: String = digest[..DIGEST_PREFIX_LEN]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    format!("{base}-{prefix}")
}

/// Path of the encoded password file that sits next to a config file.
pub fn password_file_path(config_file: &Path) -> PathBuf {
    let mut name = OsString::from(config_file.as_os_str());
    name.push(PASSWORD_FILE_SUFFIX);
    PathBuf::from(name)
}
