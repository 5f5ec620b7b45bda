//! Error taxonomy for the TUMBA API client.
//!
//! Every failure of [`HttpClient::execute`](super::client::HttpClient::execute)
//! is classified into one of these kinds and returned to the caller. Nothing
//! is retried here; callers decide whether to re-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    /// The base URL and route path did not form a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled (bad header value, body encoding, validation).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A 2xx response carried no body but the caller expected one.
    #[error("No data received")]
    EmptyData,

    /// A body was present but did not match the expected shape.
    #[error("Decoding error: {0}")]
    Decoding(#[source] serde_json::Error),

    /// The server answered 401.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The server answered 404.
    #[error("Resource not found")]
    ResourceNotFound,

    /// Any other non-2xx status.
    #[error("Server error {status}: {message}")]
    ServerError {
        status: u16,
        message: String,
        body: Option<Vec<u8>>,
    },

    /// DNS, connection, TLS or timeout failure reported by the HTTP stack.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl NetworkError {
    /// Whether this failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Transport(e) if e.is_timeout())
    }

    /// HTTP status associated with this failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::AuthenticationRequired => Some(401),
            NetworkError::ResourceNotFound => Some(404),
            NetworkError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a non-2xx status and its raw body to an error kind.
pub(crate) fn classify_status(status: u16, body: &[u8]) -> NetworkError {
    match status {
        401 => NetworkError::AuthenticationRequired,
        404 => NetworkError::ResourceNotFound,
        _ => NetworkError::ServerError {
            status,
            message: server_message(status, body),
            body: if body.is_empty() { None } else { Some(body.to_vec()) },
        },
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at the `error`, `message` and `messages` keys and a joined `errors`
/// array, then falls back to the raw text and finally to the reason phrase.
fn server_message(status: u16, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["error", "message", "messages"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        if let Some(errors) = value.get("errors").and_then(|v| v.as_array()) {
            let joined: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !joined.is_empty() {
                return joined.join(", ");
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown status")
        .to_string()
}
