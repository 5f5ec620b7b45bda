//! HTTP client that turns a [`Request`] into one round-trip and a typed result.
//!
//! The bearer token is read from the [`Session`] when the request is
//! prepared, never cached on the client. Each `execute` call is independent:
//! no retry, no deduplication, no shared queue.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::keychain::Session;

use super::completion::CompletionHandle;
use super::endpoints::{Endpoint, Headers, APPLICATION_JSON, CONTENT_TYPE};
use super::error::{classify_status, NetworkError};
use super::logging::{log_request, log_response};
use super::multipart::EncodedForm;
use super::request::{Body, Method, Request, DEFAULT_TIMEOUT};

/// Shape for calls whose response body is irrelevant. Accepts an empty body
/// and any JSON value.
pub type NoContent = serde::de::IgnoredAny;

/// Body of a [`PreparedRequest`].
#[derive(Debug, Clone)]
pub enum PreparedBody {
    Json(Vec<u8>),
    /// Sent as a `reqwest` multipart form, which supplies its own `Content-Type`.
    Multipart(EncodedForm),
}

/// A request with URL, headers and body fully assembled, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<PreparedBody>,
    pub timeout: Duration,
}

/// HTTP client for the TUMBA backend.
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
    default_timeout: Duration,
    log_traffic: bool,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3000/api/v1`).
    pub fn new(base_url: &str, session: Arc<Session>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            default_timeout: DEFAULT_TIMEOUT,
            log_traffic: true,
        }
    }

    pub fn from_config(config: &ClientConfig, session: Arc<Session>) -> Self {
        Self::new(&config.base_url, session)
            .with_timeout(config.timeout)
            .with_logging(config.log_traffic)
    }

    /// Timeout for requests that do not set their own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Enable or disable request/response diagnostics.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_traffic = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `scheme://host[:port]` of the base URL, for resolving asset paths.
    pub fn origin(&self) -> String {
        Url::parse(&self.base_url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|_| self.base_url.clone())
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Absolute URL for `request`: base URL, route path, then the query string.
    pub fn url_for(&self, request: &Request) -> Result<Url, NetworkError> {
        let raw = format!("{}{}", self.base_url, request.route().path());
        let mut url =
            Url::parse(&raw).map_err(|e| NetworkError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl(raw));
        }
        if !request.query_params().is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query_params().iter());
        }
        Ok(url)
    }

    /// Assemble URL, headers and body without touching the network.
    pub fn prepare(&self, request: &Request) -> Result<PreparedRequest, NetworkError> {
        let url = self.url_for(request)?;
        let route = request.route();

        let token = if route.authorized() {
            self.session.load_token()
        } else {
            None
        };
        let mut headers = route.headers(token.as_deref());
        merge_headers(&mut headers, request.extra_headers());
        headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));

        let body = match request.body() {
            Some(Body::Multipart(form)) => Some(PreparedBody::Multipart(form.encode()?)),
            Some(Body::Json(bytes)) => {
                headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                Some(PreparedBody::Json(bytes.clone()))
            }
            None => {
                headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                None
            }
        };

        Ok(PreparedRequest {
            method: request.http_method(),
            url,
            headers,
            body,
            timeout: request.timeout_override().unwrap_or(self.default_timeout),
        })
    }

    /// Send `request` and decode a 2xx body into `T`.
    ///
    /// Use [`NoContent`] or `()` for calls without a meaningful response body.
    pub async fn execute<T: DeserializeOwned>(&self, request: &Request) -> Result<T, NetworkError> {
        let prepared = self.prepare(request)?;
        let (status, body) = self.send(prepared).await?;
        decode_response(status, &body)
    }

    /// Run `request` in the background and hand the result to `callback`
    /// through `completion`, so every callback runs on the queue's task.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime; the request is started
    /// with `tokio::spawn`. Use [`dispatch_on`](Self::dispatch_on) to target
    /// a runtime from outside it.
    pub fn dispatch<T, F>(
        self: &Arc<Self>,
        request: Request,
        completion: &CompletionHandle,
        callback: F,
    ) -> tokio::task::JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, NetworkError>) + Send + 'static,
    {
        self.dispatch_on(&tokio::runtime::Handle::current(), request, completion, callback)
    }

    /// Like [`dispatch`](Self::dispatch), but spawns onto `runtime`.
    pub fn dispatch_on<T, F>(
        self: &Arc<Self>,
        runtime: &tokio::runtime::Handle,
        request: Request,
        completion: &CompletionHandle,
        callback: F,
    ) -> tokio::task::JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, NetworkError>) + Send + 'static,
    {
        let client = Arc::clone(self);
        let completion = completion.clone();
        runtime.spawn(async move {
            let result = client.execute::<T>(&request).await;
            if !completion.deliver(move || callback(result)) {
                log::warn!(
                    "Completion queue closed, dropping result of {}",
                    request.route().path()
                );
            }
        })
    }

    async fn send(&self, prepared: PreparedRequest) -> Result<(u16, Vec<u8>), NetworkError> {
        let method = prepared.method.as_str();
        let url = prepared.url.to_string();
        if self.log_traffic {
            log_request(method, &url, &prepared.headers, prepared.body.as_ref());
        }

        let mut header_map = HeaderMap::new();
        for (name, value) in &prepared.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NetworkError::InvalidRequest(format!("bad header name {name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| NetworkError::InvalidRequest(format!("bad value for {name}: {e}")))?;
            header_map.insert(header_name, header_value);
        }

        let mut builder = self
            .client
            .request(prepared.method.into(), prepared.url)
            .headers(header_map)
            .timeout(prepared.timeout);
        match prepared.body {
            Some(PreparedBody::Json(bytes)) => builder = builder.body(bytes),
            Some(PreparedBody::Multipart(form)) => builder = builder.multipart(form.to_form()?),
            None => {}
        }

        let response = builder.send().await.map_err(|e| {
            if self.log_traffic {
                log::debug!("{} {} failed: {}", method, url, e);
            }
            NetworkError::Transport(e)
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(NetworkError::Transport)?;

        if self.log_traffic {
            log_response(method, &url, status, &body);
        }
        Ok((status, body.to_vec()))
    }
}

/// Apply request-level headers over the route's. Names compare
/// case-insensitively, so the caller's spelling replaces the route's entry.
fn merge_headers(headers: &mut Headers, extra: &Headers) {
    for (name, value) in extra {
        headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        headers.insert(name.clone(), value.clone());
    }
}

/// Classify a status and decode a response body.
///
/// An empty 2xx body is accepted only when `T` decodes from JSON `null`
/// ([`NoContent`], `()`, `Option<_>`); otherwise it is [`NetworkError::EmptyData`].
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, NetworkError> {
    if !(200..=299).contains(&status) {
        return Err(classify_status(status, body));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice::<T>(b"null").map_err(|_| NetworkError::EmptyData);
    }
    serde_json::from_slice(body).map_err(NetworkError::Decoding)
}
