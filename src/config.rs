use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default address of the repository server control API.
fn default_server_address() -> String {
    "http://127.0.0.1:51515".to_string()
}

/// Whether the OS keyring is used when the settings file doesn't say.
///
/// On by default only where the platform store is always present (macOS, Windows).
pub fn default_keyring_enabled() -> bool {
    cfg!(any(target_os = "macos", target_os = "windows"))
}

/// Repository server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the server, e.g. `http://127.0.0.1:51515`.
    pub address: String,

    /// User for HTTP basic auth. The password comes from the environment.
    pub username: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
            username: None,
        }
    }
}

/// Settings file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the repository config file. If relative, resolved from the
    /// settings file location. Defaults to `<config dir>/repokey/repository.config`.
    pub repository_config: Option<PathBuf>,

    /// Local user name that owns keyring entries. Defaults to `$USER`.
    pub username: Option<String>,

    /// Store passwords in the OS keyring instead of a password file.
    pub use_keyring: Option<bool>,

    /// Server control settings.
    pub server: ServerConfig,
}

impl Config {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(config)
    }

    /// Load settings from a file, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the repository config path.
    ///
    /// A relative `repository_config` is resolved against `settings_dir`.
    pub fn resolve_repository_config(&self, settings_dir: &Path) -> Result<PathBuf> {
        match &self.repository_config {
            Some(path) if path.is_absolute() => Ok(path.clone()),
            Some(path) => Ok(settings_dir.join(path)),
            None => default_repository_config(),
        }
    }
}

/// Settings with every path and default resolved.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path of the repository config file.
    pub repository_config: PathBuf,

    /// Local user name that owns persisted passwords.
    pub username: String,

    /// Persist passwords in the OS keyring rather than a password file.
    pub keyring_enabled: bool,

    /// Server control settings.
    pub server: ServerConfig,
}

/// Returns the default settings file path.
///
/// Resolution order:
/// 1. `./repokey.toml` if it exists in current directory
/// 2. `<config dir>/repokey/repokey.toml`
pub fn default_settings_path() -> PathBuf {
    let local = PathBuf::from("repokey.toml");
    if local.exists() {
        return local;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("repokey").join("repokey.toml");
    }

    local
}

/// Default location of the repository config file.
pub fn default_repository_config() -> Result<PathBuf> {
    match dirs::config_dir() {
        Some(config_dir) => Ok(config_dir.join("repokey").join("repository.config")),
        None => absolute_path(Path::new("repository.config")),
    }
}

/// Name of the local user, from `$USER` or `$USERNAME`.
pub fn current_username() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Make `path` absolute against the current directory without touching the
/// filesystem; the file may not exist yet.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path))
    }
}

impl ResolvedConfig {
    /// Load and resolve settings from a file path.
    ///
    /// The repository config path is resolved relative to the settings file's
    /// parent directory.
    pub fn load(settings_path: &Path) -> Result<Self> {
        let settings_path = settings_path
            .canonicalize()
            .with_context(|| format!("Settings file not found: {}", settings_path.display()))?;

        let settings_dir = settings_path
            .parent()
            .context("Settings file has no parent directory")?;

        let config = Config::load(&settings_path)?;
        Self::from_config(config, settings_dir)
    }

    /// Load settings, falling back to defaults if the file doesn't exist.
    pub fn load_or_default(settings_path: &Path) -> Result<Self> {
        if settings_path.exists() {
            Self::load(settings_path)
        } else {
            let settings_path = absolute_path(settings_path)?;
            let settings_dir = settings_path
                .parent()
                .context("Settings path has no parent directory")?;
            Self::from_config(Config::default(), settings_dir)
        }
    }

    fn from_config(config: Config, settings_dir: &Path) -> Result<Self> {
        let repository_config = absolute_path(&config.resolve_repository_config(settings_dir)?)?;

        Ok(Self {
            repository_config,
            username: config.username.unwrap_or_else(current_username),
            keyring_enabled: config.use_keyring.unwrap_or_else(default_keyring_enabled),
            server: config.server,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_relative_repository_config() -> Result<()> {
        let config = Config {
            repository_config: Some(PathBuf::from("repo/repository.config")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_repository_config(Path::new("/home/user/backups"))?,
            PathBuf::from("/home/user/backups/repo/repository.config")
        );
        Ok(())
    }

    #[test]
    fn test_absolute_repository_config() -> Result<()> {
        let config = Config {
            repository_config: Some(PathBuf::from("/srv/repo.config")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_repository_config(Path::new("/home/user/backups"))?,
            PathBuf::from("/srv/repo.config")
        );
        Ok(())
    }

    #[test]
    fn test_load_settings() -> Result<()> {
        let dir = TempDir::new()?;
        let settings_path = dir.path().join("repokey.toml");

        let mut file = std::fs::File::create(&settings_path)?;
        writeln!(file, "repository_config = \"repository.config\"")?;
        writeln!(file, "username = \"alice\"")?;
        writeln!(file, "use_keyring = true")?;
        writeln!(file, "[server]")?;
        writeln!(file, "address = \"http://10.0.0.5:51515\"")?;
        writeln!(file, "username = \"admin\"")?;

        let config = Config::load(&settings_path)?;
        assert_eq!(
            config.repository_config,
            Some(PathBuf::from("repository.config"))
        );
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.use_keyring, Some(true));
        assert_eq!(config.server.address, "http://10.0.0.5:51515");
        assert_eq!(config.server.username.as_deref(), Some("admin"));

        Ok(())
    }

    #[test]
    fn test_load_empty_settings() -> Result<()> {
        let dir = TempDir::new()?;
        let settings_path = dir.path().join("repokey.toml");
        std::fs::File::create(&settings_path)?;

        let config = Config::load(&settings_path)?;
        assert_eq!(config.repository_config, None);
        assert_eq!(config.use_keyring, None);
        assert_eq!(config.server.address, "http://127.0.0.1:51515");

        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_toml() -> Result<()> {
        let dir = TempDir::new()?;
        let settings_path = dir.path().join("repokey.toml");
        std::fs::write(&settings_path, "use_keyring = \"sometimes")?;

        assert!(Config::load(&settings_path).is_err());
        Ok(())
    }

    #[test]
    fn test_resolved_config_resolves_relative_repository_config() -> Result<()> {
        let dir = TempDir::new()?;
        let settings_path = dir.path().join("repokey.toml");
        std::fs::write(
            &settings_path,
            "repository_config = \"repo/repository.config\"\nuse_keyring = false\nusername = \"bob\"\n",
        )?;

        let resolved = ResolvedConfig::load(&settings_path)?;
        assert_eq!(
            resolved.repository_config,
            dir.path().canonicalize()?.join("repo/repository.config")
        );
        assert!(!resolved.keyring_enabled);
        assert_eq!(resolved.username, "bob");

        Ok(())
    }

    #[test]
    fn test_resolved_config_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let settings_path = dir.path().join("repokey.toml");

        let resolved = ResolvedConfig::load_or_default(&settings_path)?;
        assert!(resolved.repository_config.is_absolute());
        assert!(resolved.repository_config.ends_with("repository.config"));
        assert_eq!(resolved.keyring_enabled, default_keyring_enabled());
        assert!(!resolved.username.is_empty());

        Ok(())
    }

    #[test]
    fn test_absolute_path_keeps_absolute_input() -> Result<()> {
        let path = Path::new("/already/absolute");
        assert_eq!(absolute_path(path)?, PathBuf::from("/already/absolute"));
        assert!(absolute_path(Path::new("relative.config"))?.is_absolute());
        Ok(())
    }
}
