//! Domain services over the HTTP client.
//!
//! Each service is constructed explicitly with the shared [`HttpClient`]
//! (and the [`Session`] where it touches stored credentials), so tests can
//! hand in an in-memory keychain and a mock server.
//!
//! [`HttpClient`]: crate::api::HttpClient
//! [`Session`]: crate::keychain::Session

mod auth;
mod comment;
mod post;
mod profile;
mod tag;

pub use auth::AuthService;
pub use comment::CommentService;
pub use post::PostService;
pub use profile::ProfileService;
pub use tag::{TagService, DEFAULT_POPULAR_LIMIT};
