//! One-time migration from the old unencrypted defaults file.
//!
//! Earlier builds kept the token and the cached user in a plain JSON file.
//! On first launch after upgrade both are moved into the keychain and the
//! plaintext copies are removed. Each item is migrated on its own: a missing
//! or unreadable item is skipped and never blocks the other.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::types::UserWithProfile;

use super::session::{Session, TOKEN_ACCOUNT, USER_ACCOUNT};

#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("Legacy store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Legacy store is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// Plaintext key-value file: a single JSON object.
#[derive(Debug, Clone)]
pub struct LegacyDefaults {
    path: PathBuf,
}

impl LegacyDefaults {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/tumba/defaults.json`.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tumba").join("defaults.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, LegacyError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<(), LegacyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }

    fn value(&self, key: &str) -> Option<Value> {
        match self.load() {
            Ok(mut map) => map.remove(key),
            Err(e) => {
                log::warn!("Legacy store {} unreadable: {}", self.path.display(), e);
                None
            }
        }
    }

    /// String value under `key`.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.value(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw data under `key`. Strings yield their bytes, anything else its JSON encoding.
    pub fn data(&self, key: &str) -> Option<Vec<u8>> {
        match self.value(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.into_bytes()),
            other => serde_json::to_vec(&other).ok(),
        }
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), LegacyError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value);
        self.persist(&map)
    }

    /// Remove `key`. Removing a missing key, or from a missing file, is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), LegacyError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Moved into the keychain and removed from the legacy file.
    Migrated,
    /// Nothing to migrate.
    Absent,
    /// Left in the legacy file; the next launch will try again.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub token: MigrationOutcome,
    pub user: MigrationOutcome,
}

impl MigrationReport {
    pub fn migrated_anything(&self) -> bool {
        self.token == MigrationOutcome::Migrated || self.user == MigrationOutcome::Migrated
    }
}

/// Move the legacy token and cached user into `session`.
///
/// Idempotent: with no legacy data present both outcomes are `Absent`.
pub fn migrate_legacy(legacy: &LegacyDefaults, session: &Session) -> MigrationReport {
    log::info!("Migrating legacy defaults from {}", legacy.path().display());
    let report = MigrationReport {
        token: migrate_token(legacy, session),
        user: migrate_user(legacy, session),
    };
    log::info!(
        "Legacy migration finished (token: {:?}, user: {:?})",
        report.token,
        report.user
    );
    report
}

fn migrate_token(legacy: &LegacyDefaults, session: &Session) -> MigrationOutcome {
    let Some(token) = legacy.string(TOKEN_ACCOUNT) else {
        return MigrationOutcome::Absent;
    };
    if !session.store_token(&token) {
        return MigrationOutcome::Skipped("keychain write failed".to_string());
    }
    if let Err(e) = legacy.remove(TOKEN_ACCOUNT) {
        log::warn!("Token migrated but legacy copy not removed: {}", e);
    }
    MigrationOutcome::Migrated
}

fn migrate_user(legacy: &LegacyDefaults, session: &Session) -> MigrationOutcome {
    let Some(data) = legacy.data(USER_ACCOUNT) else {
        return MigrationOutcome::Absent;
    };
    let user: UserWithProfile = match serde_json::from_slice(&data) {
        Ok(user) => user,
        Err(e) => {
            log::warn!("Legacy user did not decode: {}", e);
            return MigrationOutcome::Skipped(format!("undecodable user: {e}"));
        }
    };
    if !session.store_user(Some(&user)) {
        return MigrationOutcome::Skipped("keychain write failed".to_string());
    }
    if let Err(e) = legacy.remove(USER_ACCOUNT) {
        log::warn!("User migrated but legacy copy not removed: {}", e);
    }
    MigrationOutcome::Migrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::CredentialStore;
    use serde_json::json;

    fn fixture() -> (tempfile::TempDir, LegacyDefaults, Session) {
        let dir = tempfile::tempdir().unwrap();
        let legacy = LegacyDefaults::new(dir.path().join("defaults.json"));
        let session = Session::new(CredentialStore::in_memory(), "com.tumba.tests");
        (dir, legacy, session)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, legacy, _) = fixture();
        assert!(legacy.string(TOKEN_ACCOUNT).is_none());
        assert!(legacy.remove(TOKEN_ACCOUNT).is_ok());
        assert!(!legacy.path().exists());
    }

    #[test]
    fn data_accepts_object_or_encoded_string() {
        let (_dir, legacy, _) = fixture();
        legacy.set("a", json!({"id": 1})).unwrap();
        legacy.set("b", json!("{\"id\":2}")).unwrap();
        assert_eq!(legacy.data("a").unwrap(), br#"{"id":1}"#.to_vec());
        assert_eq!(legacy.data("b").unwrap(), br#"{"id":2}"#.to_vec());
    }

    #[test]
    fn token_only_migration() {
        let (_dir, legacy, session) = fixture();
        legacy.set(TOKEN_ACCOUNT, json!("tok123")).unwrap();

        let report = migrate_legacy(&legacy, &session);

        assert_eq!(report.token, MigrationOutcome::Migrated);
        assert_eq!(report.user, MigrationOutcome::Absent);
        assert_eq!(session.load_token().as_deref(), Some("tok123"));
        assert!(legacy.string(TOKEN_ACCOUNT).is_none());
        assert!(session.load_user().is_none());
    }

    #[test]
    fn undecodable_user_is_left_in_place() {
        let (_dir, legacy, session) = fixture();
        legacy.set(TOKEN_ACCOUNT, json!("tok")).unwrap();
        legacy.set(USER_ACCOUNT, json!({"unexpected": true})).unwrap();

        let report = migrate_legacy(&legacy, &session);

        assert_eq!(report.token, MigrationOutcome::Migrated);
        assert!(matches!(report.user, MigrationOutcome::Skipped(_)));
        assert!(legacy.data(USER_ACCOUNT).is_some());
        assert!(session.load_user().is_none());
    }

    #[test]
    fn user_is_migrated_and_removed() {
        let (_dir, legacy, session) = fixture();
        legacy
            .set(USER_ACCOUNT, json!({"id": 4, "email": "d@e.com"}))
            .unwrap();

        let report = migrate_legacy(&legacy, &session);

        assert_eq!(report.user, MigrationOutcome::Migrated);
        assert_eq!(session.load_user().map(|u| u.id), Some(4));
        assert!(legacy.data(USER_ACCOUNT).is_none());
    }

    #[test]
    fn second_run_is_a_no_op() {
        let (_dir, legacy, session) = fixture();
        legacy.set(TOKEN_ACCOUNT, json!("tok123")).unwrap();
        assert!(migrate_legacy(&legacy, &session).migrated_anything());

        let again = migrate_legacy(&legacy, &session);
        assert_eq!(again.token, MigrationOutcome::Absent);
        assert_eq!(again.user, MigrationOutcome::Absent);
        assert_eq!(session.load_token().as_deref(), Some("tok123"));
    }
}
