//! API client module for the TUMBA backend.
//!
//! Provides route descriptors, request construction, the HTTP client with
//! bearer-token injection, and the request/response types of the backend API.

pub mod client;
pub mod completion;
pub mod endpoints;
pub mod error;
mod logging;
pub mod multipart;
pub mod request;
pub mod types;

pub use client::{decode_response, HttpClient, NoContent, PreparedBody, PreparedRequest};
pub use completion::{completion_queue, CompletionHandle, CompletionQueue};
pub use endpoints::{
    AuthEndpoint, CommentEndpoint, Endpoint, Headers, PostEndpoint, ProfileEndpoint, Query, Route,
    TagEndpoint,
};
pub use error::NetworkError;
pub use multipart::{Attachment, EncodedAttachment, EncodedForm, ImageSource, MultipartForm};
pub use request::{Body, Method, Request};
