//! Storage backends behind [`CredentialStore`](super::CredentialStore).

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use zeroize::Zeroizing;

use super::KeychainError;

/// Raw secret storage addressed by `(service, account)`.
///
/// `set` is an upsert and `remove` is idempotent.
pub trait SecretBackend: Send + Sync {
    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<(), KeychainError>;
    fn get(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, KeychainError>;
    fn remove(&self, service: &str, account: &str) -> Result<(), KeychainError>;
}

/// The platform keystore via `keyring`. The keystore serializes access itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringBackend;

impl SecretBackend for KeyringBackend {
    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<(), KeychainError> {
        let entry = Entry::new(service, account)?;
        entry.set_secret(secret)?;
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, KeychainError> {
        let entry = Entry::new(service, account)?;
        match entry.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeychainError::from(e)),
        }
    }

    fn remove(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        let entry = Entry::new(service, account)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted, idempotent
            Err(e) => Err(KeychainError::from(e)),
        }
    }
}

/// Process-local backend. Secrets are wiped from memory when replaced or removed.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<(String, String), Zeroizing<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretBackend for MemoryBackend {
    fn set(&self, service: &str, account: &str, secret: &[u8]) -> Result<(), KeychainError> {
        let mut entries = self.entries.lock().map_err(|_| KeychainError::Poisoned)?;
        entries.insert(
            (service.to_string(), account.to_string()),
            Zeroizing::new(secret.to_vec()),
        );
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<Vec<u8>>, KeychainError> {
        let entries = self.entries.lock().map_err(|_| KeychainError::Poisoned)?;
        Ok(entries
            .get(&(service.to_string(), account.to_string()))
            .map(|secret| secret.to_vec()))
    }

    fn remove(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        let mut entries = self.entries.lock().map_err(|_| KeychainError::Poisoned)?;
        entries.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}
