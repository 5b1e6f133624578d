use std::path::PathBuf;

/// Failure reported by a secret backend.
///
/// "No such entry" is not an error: backends report it as `Ok(None)` from
/// `get` and `Ok(false)` from `delete`.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The OS credential store could not be used (missing service, locked
    /// keychain, platform failure, ...).
    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("password file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<keyring::Error> for BackendError {
    fn from(err: keyring::Error) -> Self {
        BackendError::Unavailable(err.to_string())
    }
}

/// Failure to resolve a repository password.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("can't get password: no input after {attempts} attempts")]
    InputExhausted { attempts: usize },

    #[error("failed to read password ({prompt}): {source}")]
    Read {
        prompt: String,
        #[source]
        source: std::io::Error,
    },

    #[error("password entry cancelled")]
    Cancelled,

    #[error("password from token has already been set")]
    TokenAlreadySet,

    #[error("invalid connection token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
