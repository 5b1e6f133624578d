use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repokey::app::{self, PasswordOptions};
use repokey::config::{absolute_path, default_settings_path, ResolvedConfig};
use repokey::credentials::TerminalPasswordInput;
use secrecy::SecretString;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "repokey")]
#[command(about = "Resolve, remember and forget repository passwords")]
struct Cli {
    /// Path to settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Repository config file (overrides the settings file)
    #[arg(long, env = "REPOKEY_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Repository password
    #[arg(short, long, env = "REPOKEY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Connection token carrying the repository password
    #[arg(long, env = "REPOKEY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Persist passwords in the OS keyring instead of a password file
    #[arg(
        long,
        env = "REPOKEY_USE_KEYRING",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        overrides_with = "no_use_keyring"
    )]
    use_keyring: Option<bool>,

    /// Persist passwords in a password file next to the repository config
    #[arg(long, overrides_with = "use_keyring")]
    no_use_keyring: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enter the password of an existing repository and remember it
    Connect {
        /// Don't persist the password
        #[arg(long)]
        no_persist_credentials: bool,
    },
    /// Choose the password of a new repository and remember it
    Create {
        /// Don't persist the password
        #[arg(long)]
        no_persist_credentials: bool,
    },
    /// Obtain the password, using the remembered one if available
    Open,
    /// Forget the remembered password
    Forget,
    /// Show where the password is remembered
    Status,
    /// Print a connection token for the repository
    Token,
    /// Show current configuration
    Config,
    /// Control a running repository server
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Pause scheduled snapshots for all sources
    Pause {
        /// Password for the server's basic auth
        #[arg(long, env = "REPOKEY_SERVER_PASSWORD", hide_env_values = true)]
        server_password: Option<String>,
    },
}

impl Cli {
    /// Keyring choice from the command line or environment, if any.
    fn keyring_override(&self) -> Option<bool> {
        if self.no_use_keyring {
            Some(false)
        } else {
            self.use_keyring
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let mut config = ResolvedConfig::load_or_default(&settings_path)
        .with_context(|| format!("Failed to load settings: {}", settings_path.display()))?;

    if let Some(config_file) = &cli.config_file {
        config.repository_config = absolute_path(config_file)?;
    }
    if let Some(use_keyring) = cli.keyring_override() {
        config.keyring_enabled = use_keyring;
    }

    let opts = PasswordOptions {
        password: cli.password.clone().map(SecretString::from),
        token: cli.token.clone(),
    };

    match cli.command {
        Command::Connect {
            no_persist_credentials,
        } => {
            let mut resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            print_json(&app::connect(&mut resolver, !no_persist_credentials)?)?;
        }
        Command::Create {
            no_persist_credentials,
        } => {
            let mut resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            print_json(&app::create(&mut resolver, !no_persist_credentials)?)?;
        }
        Command::Open => {
            let mut resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            print_json(&app::open(&mut resolver)?)?;
        }
        Command::Forget => {
            let resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            print_json(&app::forget(&resolver))?;
        }
        Command::Status => {
            let resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            print_json(&app::status(&resolver))?;
        }
        Command::Token => {
            let mut resolver = app::build_resolver(&config, opts, TerminalPasswordInput)?;
            let password = resolver
                .resolve(false, true)
                .context("Failed to obtain repository password")?;
            println!("{}", app::token_for(&password));
        }
        Command::Config => {
            print_json(&app::config_output(&settings_path, &config))?;
        }
        Command::Server {
            command: ServerCommand::Pause { server_password },
        } => {
            let output =
                app::pause_server(&config, server_password.map(SecretString::from)).await?;
            print_json(&output)?;
        }
    }

    Ok(())
}
