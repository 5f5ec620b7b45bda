//! Secure storage for small secrets keyed by `(service, account)`.
//!
//! Uses the `keyring` crate so secrets land in the platform keystore
//! (macOS Keychain, Windows Credential Manager, Linux keyutils). Backend
//! failures never escape this module: writes report `false`, reads report
//! `None`, and the cause is logged.

mod backend;
pub mod legacy;
pub mod session;

pub use backend::{KeyringBackend, MemoryBackend, SecretBackend};
pub use legacy::{migrate_legacy, LegacyDefaults, LegacyError, MigrationOutcome, MigrationReport};
pub use session::{Session, TOKEN_ACCOUNT, USER_ACCOUNT};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain operation failed: {0}")]
    OperationFailed(String),

    #[error("Keychain state lock poisoned")]
    Poisoned,
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        KeychainError::OperationFailed(err.to_string())
    }
}

/// At-most-one-record-per-key secret store over a pluggable backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SecretBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by the OS keychain.
    pub fn keyring() -> Self {
        Self::new(Arc::new(KeyringBackend))
    }

    /// Process-local store, for tests and headless runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Create or overwrite the record for `(service, account)`.
    pub fn save(&self, data: &[u8], service: &str, account: &str) -> bool {
        match self.backend.set(service, account, data) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Keychain save failed for {}/{}: {}", service, account, e);
                false
            }
        }
    }

    /// Stored bytes, or `None` when absent or unreadable.
    pub fn read(&self, service: &str, account: &str) -> Option<Vec<u8>> {
        match self.backend.get(service, account) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Keychain read failed for {}/{}: {}", service, account, e);
                None
            }
        }
    }

    /// Remove the record. Removing a missing record succeeds.
    pub fn delete(&self, service: &str, account: &str) -> bool {
        match self.backend.remove(service, account) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Keychain delete failed for {}/{}: {}", service, account, e);
                false
            }
        }
    }

    /// JSON-encode `item` and save it.
    pub fn save_json<T: Serialize + ?Sized>(&self, item: &T, service: &str, account: &str) -> bool {
        match serde_json::to_vec(item) {
            Ok(data) => self.save(&data, service, account),
            Err(e) => {
                log::warn!("Keychain encode failed for {}/{}: {}", service, account, e);
                false
            }
        }
    }

    /// Read and JSON-decode a record. A record that does not decode reads as absent.
    pub fn read_json<T: DeserializeOwned>(&self, service: &str, account: &str) -> Option<T> {
        let data = self.read(service, account)?;
        match serde_json::from_slice(&data) {
            Ok(item) => Some(item),
            Err(e) => {
                log::debug!("Keychain record {}/{} did not decode: {}", service, account, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
