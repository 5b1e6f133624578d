use serde::Serialize;

use crate::credentials::SecretSource;

/// JSON output for commands that obtain a password
#[derive(Debug, Serialize)]
pub struct PasswordOutput {
    pub config_file: String,
    pub source: SecretSource,
    pub persisted: bool,
    pub backend: Option<String>,
}

/// JSON output for forget
#[derive(Debug, Serialize)]
pub struct ForgetOutput {
    pub config_file: String,
    pub password_file: String,
}

/// JSON output for status
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub config_file: String,
    pub username: String,
    pub backend: String,
    pub keyring_enabled: bool,
    pub vault_item_id: String,
    pub password_file: String,
    pub has_persisted_password: bool,
}

/// JSON output for server control calls
#[derive(Debug, Serialize)]
pub struct ServerActionOutput {
    pub server: String,
    pub action: String,
    pub ok: bool,
}
