//! Client library for the TUMBA social platform backend.
//!
//! - [`api`]: route descriptors, request building, the HTTP client and wire types.
//! - [`keychain`]: keychain-backed credential store and the signed-in session.
//! - [`services`]: auth, profile, post, comment and tag operations.
//! - [`state`]: everything wired together from a [`ClientConfig`].

pub mod api;
pub mod config;
pub mod keychain;
pub mod services;
pub mod state;

pub use api::{HttpClient, NetworkError, NoContent, Request};
pub use config::{ClientConfig, ConfigError};
pub use keychain::{CredentialStore, KeychainError, Session};
pub use state::AppState;
