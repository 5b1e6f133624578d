use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::config::ResolvedConfig;
use crate::credentials::{
    password_file_path, vault_item_id, ConnectionToken, CredentialResolver, PasswordInput,
    PasswordPersistence, PasswordPrompter, ResolverConfig, SecretSource,
};

use super::types::{ForgetOutput, PasswordOutput, StatusOutput};

/// Non-interactive password inputs gathered from flags and environment.
#[derive(Debug, Default)]
pub struct PasswordOptions {
    /// `--password` / `REPOKEY_PASSWORD`.
    pub password: Option<SecretString>,
    /// `--token` / `REPOKEY_TOKEN`.
    pub token: Option<String>,
}

/// Build a resolver for the configured repository reading from `input`.
pub fn build_resolver<I: PasswordInput>(
    config: &ResolvedConfig,
    opts: PasswordOptions,
    input: I,
) -> Result<CredentialResolver<I>> {
    let resolver_config = ResolverConfig::new(&config.repository_config, &config.username)
        .with_explicit_password(opts.password);

    if let Some(token) = opts.token {
        let token = ConnectionToken::parse(&token).context("Failed to parse connection token")?;
        if let Some(password) = token.into_password() {
            resolver_config.set_password_from_token(password)?;
        }
    }

    Ok(CredentialResolver::new(
        resolver_config,
        PasswordPersistence::new(config.keyring_enabled),
        PasswordPrompter::new(input),
    ))
}

fn resolve_and_maybe_persist<I: PasswordInput>(
    resolver: &mut CredentialResolver<I>,
    is_new: bool,
    persist: bool,
) -> Result<PasswordOutput> {
    let (password, source) = resolver
        .resolve_with_source(is_new, false)
        .context("Failed to obtain repository password")?;

    let backend = if persist {
        resolver
            .remember(&password)
            .context("Failed to persist repository password")?;
        Some(resolver.persistence().active_backend().to_string())
    } else {
        None
    };

    Ok(PasswordOutput {
        config_file: resolver.config_file().display().to_string(),
        source,
        persisted: persist,
        backend,
    })
}

/// Obtain the password of an existing repository, optionally persisting it.
///
/// Persisted passwords are not consulted: connecting is how they get (re)set.
pub fn connect<I: PasswordInput>(
    resolver: &mut CredentialResolver<I>,
    persist: bool,
) -> Result<PasswordOutput> {
    resolve_and_maybe_persist(resolver, false, persist)
}

/// Choose the password of a new repository, optionally persisting it.
pub fn create<I: PasswordInput>(
    resolver: &mut CredentialResolver<I>,
    persist: bool,
) -> Result<PasswordOutput> {
    resolve_and_maybe_persist(resolver, true, persist)
}

/// Obtain the password of an existing repository, using a persisted one if present.
pub fn open<I: PasswordInput>(resolver: &mut CredentialResolver<I>) -> Result<PasswordOutput> {
    let (_, source) = resolver
        .resolve_with_source(false, true)
        .context("Failed to obtain repository password")?;

    Ok(PasswordOutput {
        config_file: resolver.config_file().display().to_string(),
        persisted: source == SecretSource::Persisted,
        source,
        backend: None,
    })
}

/// Remove the persisted password from the keyring and the password file.
pub fn forget<I: PasswordInput>(resolver: &CredentialResolver<I>) -> ForgetOutput {
    resolver.forget();

    ForgetOutput {
        config_file: resolver.config_file().display().to_string(),
        password_file: password_file_path(resolver.config_file())
            .display()
            .to_string(),
    }
}

/// Report where the password would be persisted and whether one is stored.
pub fn status<I: PasswordInput>(resolver: &CredentialResolver<I>) -> StatusOutput {
    let config = resolver.config();
    let persistence = resolver.persistence();

    StatusOutput {
        config_file: config.config_file.display().to_string(),
        username: config.username.clone(),
        backend: persistence.active_backend().to_string(),
        keyring_enabled: persistence.keyring_enabled(),
        vault_item_id: vault_item_id(&config.config_file),
        password_file: password_file_path(&config.config_file)
            .display()
            .to_string(),
        has_persisted_password: persistence
            .load(&config.config_file, &config.username)
            .is_some(),
    }
}

/// Print `password` wrapped in a connection token.
pub fn token_for(password: &SecretString) -> String {
    ConnectionToken::encode(password)
}
