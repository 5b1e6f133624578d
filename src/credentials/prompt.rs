//! Interactive password entry.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use secrecy::SecretString;

use super::CredentialError;

/// Prompt shown when a new repository password is being chosen.
pub const NEW_PASSWORD_PROMPT: &str = "Enter password to create new repository: ";

/// Prompt shown for the second, verifying entry of a new password.
pub const VERIFY_PASSWORD_PROMPT: &str = "Re-enter password for verification: ";

/// Prompt shown when opening an existing repository.
pub const EXISTING_PASSWORD_PROMPT: &str = "Enter password to open repository: ";

/// Message shown when the two entries of a new password differ.
pub const MISMATCH_MESSAGE: &str = "Passwords don't match!";

/// Maximum reads per `collect_once` call.
pub const MAX_ATTEMPTS: usize = 5;

/// Source of masked password input.
pub trait PasswordInput {
    /// Show `prompt` and read one line without echoing it.
    fn read_password(&mut self, prompt: &str) -> io::Result<String>;

    /// Show a diagnostic message to the user.
    fn notify(&mut self, message: &str) -> io::Result<()>;
}

/// Masked terminal input on stderr.
#[cfg(feature = "terminal")]
#[derive(Debug, Default)]
pub struct TerminalPasswordInput;

#[cfg(feature = "terminal")]
impl PasswordInput for TerminalPasswordInput {
    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        use dialoguer::console::Term;
        use dialoguer::Password;

        // Empty input is accepted here so the retry policy stays in the prompter.
        Password::new()
            .with_prompt(prompt.trim_end().trim_end_matches(':'))
            .allow_empty_password(true)
            .interact_on(&Term::stderr())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        dialoguer::console::Term::stderr().write_line(message)
    }
}

/// Replays a fixed sequence of inputs; used by tests and non-interactive callers.
#[derive(Debug, Default)]
pub struct ScriptedPasswordInput {
    inputs: VecDeque<String>,
    prompts: Vec<String>,
    messages: Vec<String>,
}

impl ScriptedPasswordInput {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Messages passed to `notify` so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Inputs not consumed yet.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl PasswordInput for ScriptedPasswordInput {
    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted input"))
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        self.messages.push(message.to_string());
        Ok(())
    }
}

/// Bounded-retry password collection on top of a [`PasswordInput`].
pub struct PasswordPrompter<I> {
    input: I,
    max_attempts: usize,
    cancel: Arc<AtomicBool>,
}

impl<I: PasswordInput> PasswordPrompter<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            max_attempts: MAX_ATTEMPTS,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag, checked before every confirmation round.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that aborts an in-progress confirmation loop when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Ask once, re-prompting on empty input up to [`MAX_ATTEMPTS`] times.
    ///
    /// An error from the underlying input ends collection immediately.
    pub fn collect_once(&mut self, prompt: &str) -> Result<SecretString, CredentialError> {
        for _ in 0..self.max_attempts {
            let password =
                self.input
                    .read_password(prompt)
                    .map_err(|source| CredentialError::Read {
                        prompt: prompt.trim_end().to_string(),
                        source,
                    })?;

            if password.is_empty() {
                continue;
            }

            return Ok(SecretString::from(password));
        }

        Err(CredentialError::InputExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Ask for a new password twice until both entries match.
    pub fn collect_with_confirmation(&mut self) -> Result<SecretString, CredentialError> {
        use secrecy::ExposeSecret;

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return Err(CredentialError::Cancelled);
            }

            let first = self.collect_once(NEW_PASSWORD_PROMPT)?;
            let second = self.collect_once(VERIFY_PASSWORD_PROMPT)?;

            if first.expose_secret() == second.expose_secret() {
                return Ok(first);
            }

            tracing::debug!("password confirmation mismatch, restarting entry");
            // A failed notice must not turn a mismatch into a hard error.
            if let Err(e) = self.input.notify(MISMATCH_MESSAGE) {
                tracing::debug!(error = %e, "unable to show password mismatch notice");
            }
        }
    }

    /// Ask for the password of an existing repository.
    pub fn collect_existing(&mut self) -> Result<SecretString, CredentialError> {
        self.collect_once(EXISTING_PASSWORD_PROMPT)
    }
}
