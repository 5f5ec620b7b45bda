//! The signed-in session: bearer token and cached user in the keychain.

use crate::api::types::UserWithProfile;

use super::CredentialStore;

/// Keychain account holding the JSON-encoded bearer token.
pub const TOKEN_ACCOUNT: &str = "authToken";

/// Keychain account holding the JSON-encoded [`UserWithProfile`].
pub const USER_ACCOUNT: &str = "currentUser";

/// Default keychain service, matching the app bundle identifier.
pub const DEFAULT_SERVICE: &str = "com.tumba.app";

/// Credential records of one app install.
#[derive(Debug, Clone)]
pub struct Session {
    store: CredentialStore,
    service: String,
}

impl Session {
    pub fn new(store: CredentialStore, service: impl Into<String>) -> Self {
        Self {
            store,
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn store_token(&self, token: &str) -> bool {
        let saved = self.store.save_json(token, &self.service, TOKEN_ACCOUNT);
        if saved {
            log::info!("Token stored in keychain");
        } else {
            log::warn!("Failed to store token in keychain");
        }
        saved
    }

    pub fn load_token(&self) -> Option<String> {
        self.store.read_json(&self.service, TOKEN_ACCOUNT)
    }

    pub fn remove_token(&self) -> bool {
        self.store.delete(&self.service, TOKEN_ACCOUNT)
    }

    /// Cache the signed-in user. `None` deletes the cached record.
    pub fn store_user(&self, user: Option<&UserWithProfile>) -> bool {
        match user {
            Some(user) => {
                let saved = self.store.save_json(user, &self.service, USER_ACCOUNT);
                if !saved {
                    log::warn!("Failed to store user {} in keychain", user.id);
                }
                saved
            }
            None => self.store.delete(&self.service, USER_ACCOUNT),
        }
    }

    pub fn load_user(&self) -> Option<UserWithProfile> {
        self.store.read_json(&self.service, USER_ACCOUNT)
    }

    pub fn is_signed_in(&self) -> bool {
        self.load_token().is_some()
    }

    /// Drop both records. Returns `true` only if both deletions succeeded.
    pub fn clear(&self) -> bool {
        let token = self.remove_token();
        let user = self.store_user(None);
        token && user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(CredentialStore::in_memory(), DEFAULT_SERVICE)
    }

    fn user() -> UserWithProfile {
        serde_json::from_value(serde_json::json!({"id": 1, "email": "a@b.com"})).unwrap()
    }

    #[test]
    fn token_is_stored_as_json_string() {
        let session = session();
        assert!(session.store_token("xyz"));
        assert_eq!(session.load_token().as_deref(), Some("xyz"));
        assert_eq!(
            session.store().read(DEFAULT_SERVICE, TOKEN_ACCOUNT).as_deref(),
            Some(&b"\"xyz\""[..])
        );
        assert!(session.is_signed_in());
    }

    #[test]
    fn storing_none_user_deletes_record() {
        let session = session();
        assert!(session.store_user(Some(&user())));
        assert_eq!(session.load_user(), Some(user()));
        assert!(session.store_user(None));
        assert!(session.load_user().is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let session = session();
        session.store_token("xyz");
        session.store_user(Some(&user()));
        assert!(session.clear());
        assert!(!session.is_signed_in());
        assert!(session.load_user().is_none());
    }
}
