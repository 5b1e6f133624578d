use std::path::Path;

use crate::config::ResolvedConfig;

pub fn config_output(settings_path: &Path, config: &ResolvedConfig) -> serde_json::Value {
    serde_json::json!({
        "settings_file": settings_path.display().to_string(),
        "repository_config": config.repository_config.display().to_string(),
        "username": config.username,
        "use_keyring": config.keyring_enabled,
        "server": {
            "address": config.server.address,
            "username": config.server.username,
        }
    })
}
