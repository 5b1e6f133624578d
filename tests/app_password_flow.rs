mod support;

use anyhow::Result;
use repokey::app::{self, PasswordOptions};
use repokey::credentials::{
    password_file_path, vault_item_id, ConnectionToken, ScriptedPasswordInput, SecretSource,
};
use secrecy::SecretString;
use support::TempRepo;

#[test]
fn connect_persists_and_open_reuses_password() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let mut resolver = app::build_resolver(
        &config,
        PasswordOptions::default(),
        ScriptedPasswordInput::new(["hunter2"]),
    )?;
    let output = app::connect(&mut resolver, true)?;
    assert_eq!(output.source, SecretSource::Prompted);
    assert!(output.persisted);
    assert_eq!(output.backend.as_deref(), Some("password file"));
    assert!(password_file_path(&repo.config_file).exists());

    let mut resolver = app::build_resolver(
        &config,
        PasswordOptions::default(),
        ScriptedPasswordInput::new(Vec::<String>::new()),
    )?;
    let output = app::open(&mut resolver)?;
    assert_eq!(output.source, SecretSource::Persisted);
    assert!(output.persisted);
    Ok(())
}

#[test]
fn connect_without_persist_leaves_no_file() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let opts = PasswordOptions {
        password: Some(SecretString::from("from-flag")),
        token: None,
    };
    let mut resolver = app::build_resolver(&config, opts, ScriptedPasswordInput::default())?;
    let output = app::connect(&mut resolver, false)?;

    assert_eq!(output.source, SecretSource::Explicit);
    assert!(!output.persisted);
    assert!(output.backend.is_none());
    assert!(!password_file_path(&repo.config_file).exists());
    Ok(())
}

#[test]
fn create_confirms_new_password() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let mut resolver = app::build_resolver(
        &config,
        PasswordOptions::default(),
        ScriptedPasswordInput::new(["one", "two", "three", "three"]),
    )?;
    let output = app::create(&mut resolver, true)?;

    assert_eq!(output.source, SecretSource::Prompted);
    let status = app::status(&resolver);
    assert!(status.has_persisted_password);
    Ok(())
}

#[test]
fn token_option_takes_precedence() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let opts = PasswordOptions {
        password: Some(SecretString::from("from-flag")),
        token: Some(ConnectionToken::encode(&SecretString::from("from-token"))),
    };
    let mut resolver = app::build_resolver(&config, opts, ScriptedPasswordInput::default())?;
    let output = app::open(&mut resolver)?;

    assert_eq!(output.source, SecretSource::Token);
    assert!(!output.persisted);
    Ok(())
}

#[test]
fn invalid_token_is_rejected() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let opts = PasswordOptions {
        password: None,
        token: Some("definitely-not-a-token".to_string()),
    };
    assert!(app::build_resolver(&config, opts, ScriptedPasswordInput::default()).is_err());
    Ok(())
}

#[test]
fn forget_then_status_reports_nothing_stored() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(false);

    let opts = PasswordOptions {
        password: Some(SecretString::from("pw")),
        token: None,
    };
    let mut resolver = app::build_resolver(&config, opts, ScriptedPasswordInput::default())?;
    app::connect(&mut resolver, true)?;
    assert!(app::status(&resolver).has_persisted_password);

    let output = app::forget(&resolver);
    assert_eq!(
        output.password_file,
        password_file_path(&repo.config_file).display().to_string()
    );

    let status = app::status(&resolver);
    assert!(!status.has_persisted_password);
    assert_eq!(status.backend, "password file");
    assert_eq!(status.username, "alice");
    assert_eq!(status.vault_item_id, vault_item_id(&repo.config_file));
    Ok(())
}

#[test]
fn config_output_reports_resolved_paths() -> Result<()> {
    let repo = TempRepo::new()?;
    let config = repo.resolved_config(true);
    let settings = repo.dir.path().join("repokey.toml");

    let output = app::config_output(&settings, &config);
    assert_eq!(output["use_keyring"], true);
    assert_eq!(output["username"], "alice");
    assert_eq!(
        output["repository_config"],
        repo.config_file.display().to_string()
    );
    assert_eq!(output["server"]["address"], "http://127.0.0.1:51515");
    Ok(())
}
