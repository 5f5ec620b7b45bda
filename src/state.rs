//! Application state for the TUMBA client.
//!
//! Wires one [`Session`], one [`HttpClient`] and the domain services together.
//! Everything is shared through `Arc`, so the state can be handed to
//! concurrent tasks.

use std::sync::Arc;

use crate::api::HttpClient;
use crate::config::ClientConfig;
use crate::keychain::{migrate_legacy, CredentialStore, LegacyDefaults, MigrationReport, Session};
use crate::services::{AuthService, CommentService, PostService, ProfileService, TagService};

pub struct AppState {
    pub config: ClientConfig,

    /// Token and current user, persisted in the keychain.
    pub session: Arc<Session>,

    /// HTTP client shared by every service.
    pub client: Arc<HttpClient>,

    pub auth: AuthService,
    pub profiles: ProfileService,
    pub posts: PostService,
    pub comments: CommentService,
    pub tags: TagService,
}

impl AppState {
    /// Build state over an explicit credential store.
    pub fn new(config: ClientConfig, store: CredentialStore) -> Self {
        let session = Arc::new(Session::new(store, config.keychain_service.clone()));
        let client = Arc::new(HttpClient::from_config(&config, Arc::clone(&session)));
        log::debug!("API base URL: {}", client.base_url());

        Self {
            auth: AuthService::new(Arc::clone(&client), Arc::clone(&session)),
            profiles: ProfileService::new(Arc::clone(&client), Arc::clone(&session)),
            posts: PostService::new(Arc::clone(&client), Arc::clone(&session)),
            comments: CommentService::new(Arc::clone(&client)),
            tags: TagService::new(Arc::clone(&client)),
            config,
            session,
            client,
        }
    }

    /// Build state over the platform keychain.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(config, CredentialStore::keyring())
    }

    /// Move any pre-keychain session out of the legacy defaults file.
    ///
    /// Returns `None` when no legacy location is configured.
    pub fn migrate_legacy(&self) -> Option<MigrationReport> {
        let path = self.config.legacy_store_path.as_ref()?;
        let legacy = LegacyDefaults::new(path);
        let report = migrate_legacy(&legacy, &self.session);
        if report.migrated_anything() {
            log::info!("Migrated legacy session from {}", path.display());
        }
        Some(report)
    }
}
