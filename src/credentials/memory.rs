//! In-memory secret backend for testing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};

use super::item_id::vault_item_id;
use super::{BackendError, SecretBackend};

#[derive(Default)]
struct MemoryState {
    entries: Mutex<HashMap<(String, String), String>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

/// In-memory stand-in for the OS keyring.
///
/// Clones share the same entries, so a test can keep a handle while the
/// persistence layer owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail as if the platform store were missing.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of get/set/delete calls made so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.state
            .entries
            .lock()
            .expect("memory backend lock poisoned")
    }

    fn check(&self) -> Result<(), BackendError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(
                "memory backend switched off".to_string(),
            ));
        }
        Ok(())
    }

    fn key(config_file: &Path, username: &str) -> (String, String) {
        (vault_item_id(config_file), username.to_string())
    }
}

impl SecretBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(
        &self,
        config_file: &Path,
        username: &str,
    ) -> Result<Option<SecretString>, BackendError> {
        self.check()?;
        Ok(self
            .lock()
            .get(&Self::key(config_file, username))
            .map(|v| SecretString::from(v.clone())))
    }

    fn set(
        &self,
        config_file: &Path,
        username: &str,
        secret: &SecretString,
    ) -> Result<(), BackendError> {
        self.check()?;
        self.lock().insert(
            Self::key(config_file, username),
            secret.expose_secret().to_string(),
        );
        Ok(())
    }

    fn delete(&self, config_file: &Path, username: &str) -> Result<bool, BackendError> {
        self.check()?;
        Ok(self
            .lock()
            .remove(&Self::key(config_file, username))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_scoped_by_user() -> Result<(), BackendError> {
        let backend = MemoryBackend::new();
        let config = Path::new("/repo/repository.config");

        backend.set(config, "alice", &SecretString::from("a"))?;
        assert!(backend.get(config, "bob")?.is_none());
        assert_eq!(
            backend.get(config, "alice")?.unwrap().expose_secret(),
            "a"
        );
        Ok(())
    }

    #[test]
    fn test_clones_share_state() -> Result<(), BackendError> {
        let backend = MemoryBackend::new();
        let handle = backend.clone();
        backend.set(Path::new("/r"), "alice", &SecretString::from("a"))?;
        assert_eq!(handle.len(), 1);
        assert_eq!(handle.calls(), 1);
        Ok(())
    }

    #[test]
    fn test_unavailable_fails_every_operation() {
        let backend = MemoryBackend::new();
        backend.set_unavailable(true);
        let config = Path::new("/r");

        assert!(matches!(
            backend.get(config, "alice"),
            Err(BackendError::Unavailable(_))
        ));
        assert!(backend
            .set(config, "alice", &SecretString::from("a"))
            .is_err());
        assert!(backend.delete(config, "alice").is_err());
    }
}
